//! Stack machine to assembly translator.
mod command;
mod translator;

use crate::error::TackResult;

pub use self::{
    command::{Command, Segment},
    translator::Translator,
};

/// Translate one source unit without bootstrap code.
pub fn translate(unit: &str, source: &str) -> TackResult<String> {
    let mut translator = Translator::new(unit);
    translator.translate(source)?;
    Ok(translator.finish())
}

/// Translate a whole program, prefixed with bootstrap code that sets
/// up the stack and calls the entry point.
pub fn translate_program(units: &[(&str, &str)]) -> TackResult<String> {
    let mut translator = Translator::new("Bootstrap");
    translator.emit_bootstrap();
    for (unit, source) in units {
        translator.set_unit(*unit);
        translator.translate(source)?;
    }
    Ok(translator.finish())
}
