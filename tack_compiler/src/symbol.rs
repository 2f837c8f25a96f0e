//! Two-tier symbol table for variable declarations.
use crate::vm_writer::Segment;

use smol_str::SmolStr;
use std::{collections::BTreeMap, error, fmt};

/// Storage class of a declared variable.
///
/// Each kind maps to one VM segment, and indices are dense per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Class-level `static` declaration.
    Static,
    /// Class-level `field` declaration, stored on the current object.
    This,
    /// Subroutine parameter.
    Argument,
    /// Subroutine `var` declaration.
    Local,
}

impl VarKind {
    #[inline]
    pub fn segment(self) -> Segment {
        match self {
            VarKind::Static => Segment::Static,
            VarKind::This => Segment::This,
            VarKind::Argument => Segment::Argument,
            VarKind::Local => Segment::Local,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            VarKind::Static => 0,
            VarKind::This => 1,
            VarKind::Argument => 2,
            VarKind::Local => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Class,
    Subroutine,
}

/// A resolved variable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name: SmolStr,
    /// Declared type, kept verbatim. Used to resolve method call
    /// targets on object-typed variables.
    pub ty: SmolStr,
    pub kind: VarKind,
    pub index: u16,
}

/// Declaring the same name twice within one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSymbol {
    pub name: SmolStr,
}

impl error::Error for DuplicateSymbol {}

impl fmt::Display for DuplicateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "duplicate symbol '{}'", self.name)
    }
}

/// One scope's worth of declarations.
#[derive(Debug, Default)]
struct Tier {
    vars: BTreeMap<SmolStr, Var>,
    /// Running index per [`VarKind`], indexed by `VarKind::slot`.
    counts: [u16; 4],
}

impl Tier {
    fn clear(&mut self) {
        self.vars.clear();
        self.counts = [0; 4];
    }
}

/// Symbol table with a class tier and a subroutine tier.
///
/// Lookup tries the subroutine tier first, so a subroutine-level name
/// shadows a class-level name for the duration of the subroutine.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: Tier,
    subroutine: Tier,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration in the given scope, assigning it the next
    /// index for its kind within that scope.
    pub fn declare(
        &mut self,
        scope: Scope,
        name: &str,
        ty: &str,
        kind: VarKind,
    ) -> Result<Var, DuplicateSymbol> {
        let tier = self.tier_mut(scope);
        if tier.vars.contains_key(name) {
            return Err(DuplicateSymbol { name: name.into() });
        }

        let index = tier.counts[kind.slot()];
        tier.counts[kind.slot()] += 1;

        let var = Var {
            name: name.into(),
            ty: ty.into(),
            kind,
            index,
        };
        tier.vars.insert(var.name.clone(), var.clone());
        Ok(var)
    }

    pub fn resolve(&self, name: &str) -> Option<&Var> {
        self.subroutine
            .vars
            .get(name)
            .or_else(|| self.class.vars.get(name))
    }

    /// Discard all declarations in the given scope. Resetting the
    /// subroutine scope leaves the class scope untouched.
    pub fn reset(&mut self, scope: Scope) {
        self.tier_mut(scope).clear();
    }

    /// Number of variables of `kind` declared in `scope` so far.
    pub fn count(&self, scope: Scope, kind: VarKind) -> u16 {
        let tier = match scope {
            Scope::Class => &self.class,
            Scope::Subroutine => &self.subroutine,
        };
        tier.counts[kind.slot()]
    }

    fn tier_mut(&mut self, scope: Scope) -> &mut Tier {
        match scope {
            Scope::Class => &mut self.class,
            Scope::Subroutine => &mut self.subroutine,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dense_indices_per_kind() {
        let mut table = SymbolTable::new();
        table.declare(Scope::Class, "a", "int", VarKind::Static).unwrap();
        table.declare(Scope::Class, "b", "int", VarKind::This).unwrap();
        table.declare(Scope::Class, "c", "int", VarKind::This).unwrap();
        table.declare(Scope::Class, "d", "int", VarKind::Static).unwrap();

        assert_eq!(table.resolve("a").unwrap().index, 0);
        assert_eq!(table.resolve("d").unwrap().index, 1);
        assert_eq!(table.resolve("b").unwrap().index, 0);
        assert_eq!(table.resolve("c").unwrap().index, 1);
        assert_eq!(table.count(Scope::Class, VarKind::This), 2);
    }

    #[test]
    fn test_subroutine_shadows_class() {
        let mut table = SymbolTable::new();
        table.declare(Scope::Class, "x", "int", VarKind::This).unwrap();
        table
            .declare(Scope::Subroutine, "x", "boolean", VarKind::Local)
            .unwrap();

        let var = table.resolve("x").unwrap();
        assert_eq!(var.kind, VarKind::Local);
        assert_eq!(var.ty.as_str(), "boolean");
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut table = SymbolTable::new();
        table.declare(Scope::Subroutine, "x", "int", VarKind::Local).unwrap();
        let err = table
            .declare(Scope::Subroutine, "x", "int", VarKind::Argument)
            .unwrap_err();
        assert_eq!(err.name.as_str(), "x");
    }

    #[test]
    fn test_reset_subroutine_keeps_class() {
        let mut table = SymbolTable::new();
        table.declare(Scope::Class, "field0", "int", VarKind::This).unwrap();
        table
            .declare(Scope::Subroutine, "temp0", "int", VarKind::Local)
            .unwrap();

        table.reset(Scope::Subroutine);
        assert!(table.resolve("temp0").is_none());
        assert!(table.resolve("field0").is_some());
        assert_eq!(table.count(Scope::Subroutine, VarKind::Local), 0);

        // Indices restart after a reset.
        let var = table
            .declare(Scope::Subroutine, "temp1", "int", VarKind::Local)
            .unwrap();
        assert_eq!(var.index, 0);
    }
}
