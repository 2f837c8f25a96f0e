//! Assembler
mod assembler;
mod code;
mod symbols;

use crate::error::TackResult;

pub use self::{assembler::Assembler, symbols::SymbolTable};

pub fn assemble(source_code: impl AsRef<str>) -> TackResult<Vec<u16>> {
    let asm = Assembler::new();
    Ok(asm.assemble(source_code.as_ref())?)
}

/// Render words as binary text, one 16-bit word per line.
pub fn to_binary_text(words: &[u16]) -> String {
    let mut out = String::with_capacity(words.len() * 17);
    for word in words {
        out.push_str(&format!("{:016b}\n", word));
    }
    out
}
