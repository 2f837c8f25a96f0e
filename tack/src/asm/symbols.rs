//! Assembler symbol table.
use std::collections::BTreeMap;

/// First address available for allocated variables.
const VAR_BASE: u16 = 16;

/// Maps label and variable names to addresses.
///
/// Created pre-loaded with the architecture's fixed registers and
/// device addresses. Unknown names referenced by an address
/// instruction become variables, allocated sequentially from 16.
pub struct SymbolTable {
    map: BTreeMap<String, u16>,
    next_address: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        map.insert("SP".to_string(), 0);
        map.insert("LCL".to_string(), 1);
        map.insert("ARG".to_string(), 2);
        map.insert("THIS".to_string(), 3);
        map.insert("THAT".to_string(), 4);
        for register in 0..16 {
            map.insert(format!("R{}", register), register);
        }
        map.insert("SCREEN".to_string(), 16384);
        map.insert("KBD".to_string(), 24576);

        Self {
            map,
            next_address: VAR_BASE,
        }
    }

    /// Bind a label to an instruction address.
    pub fn define(&mut self, name: &str, address: u16) {
        self.map.insert(name.to_string(), address);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Address of `name`, allocating a fresh variable cell when the
    /// name is unknown.
    pub fn resolve_or_allocate(&mut self, name: &str) -> u16 {
        if let Some(address) = self.map.get(name) {
            return *address;
        }

        let address = self.next_address;
        self.next_address += 1;
        self.map.insert(name.to_string(), address);
        address
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
