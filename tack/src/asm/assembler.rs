//! Two-pass assembler.
use super::{code, symbols::SymbolTable};
use crate::error::AsmError;

/// Largest value an address instruction can load.
const MAX_ADDRESS: u16 = 0x7FFF;

pub struct Assembler {
    symbols: SymbolTable,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
        }
    }

    /// Assemble source text into 16-bit binary words.
    ///
    /// The first pass binds label declarations `(NAME)` to the address
    /// of the following instruction; the second pass encodes
    /// instructions, allocating variables on first reference.
    pub fn assemble(mut self, source: &str) -> Result<Vec<u16>, AsmError> {
        let statements = clean(source);

        let mut address = 0u16;
        for (line, text) in &statements {
            if let Some(name) = label_name(text) {
                if name.is_empty() {
                    return Err(AsmError::new(*line, "empty label name"));
                }
                self.symbols.define(name, address);
            } else {
                address += 1;
            }
        }

        let mut words = Vec::with_capacity(statements.len());
        for (line, text) in &statements {
            if label_name(text).is_some() {
                continue;
            }
            let word = if let Some(target) = text.strip_prefix('@') {
                self.encode_address(*line, target)?
            } else {
                encode_compute(*line, text)?
            };
            words.push(word);
        }

        Ok(words)
    }

    fn encode_address(&mut self, line: usize, target: &str) -> Result<u16, AsmError> {
        if target.chars().all(|c| c.is_ascii_digit()) {
            match target.parse::<u16>() {
                Ok(value) if value <= MAX_ADDRESS => Ok(value),
                _ => Err(AsmError::new(
                    line,
                    format!("address {} out of range", target),
                )),
            }
        } else {
            Ok(self.symbols.resolve_or_allocate(target))
        }
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip comments and whitespace, keeping 1-based line numbers for
/// error reporting.
fn clean(source: &str) -> Vec<(usize, String)> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let text: String = raw
                .split("//")
                .next()
                .unwrap_or("")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if text.is_empty() {
                None
            } else {
                Some((index + 1, text))
            }
        })
        .collect()
}

fn label_name(text: &str) -> Option<&str> {
    text.strip_prefix('(')?.strip_suffix(')')
}

/// Encode `dest=comp;jump` where both the destination and the jump are
/// optional.
fn encode_compute(line: usize, text: &str) -> Result<u16, AsmError> {
    let (rest, jump_bits) = match text.split_once(';') {
        Some((rest, jump_text)) => {
            let bits = code::jump(jump_text)
                .ok_or_else(|| AsmError::new(line, format!("unknown jump '{}'", jump_text)))?;
            (rest, bits)
        }
        None => (text, 0),
    };

    let (dest_bits, comp_text) = match rest.split_once('=') {
        Some((dest_text, comp_text)) => {
            let bits = code::dest(dest_text)
                .ok_or_else(|| AsmError::new(line, format!("unknown destination '{}'", dest_text)))?;
            (bits, comp_text)
        }
        None => (0, rest),
    };

    let comp_bits = code::comp(comp_text)
        .ok_or_else(|| AsmError::new(line, format!("unknown computation '{}'", comp_text)))?;

    Ok(0b111 << 13 | comp_bits << 6 | dest_bits << 3 | jump_bits)
}
