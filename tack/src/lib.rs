//! Backend of the toolchain: translates stack machine code to
//! two-operand assembly, and assembles that to 16-bit binary words.
pub mod asm;
pub mod error;
pub mod vm;

pub use error::{AsmError, TackError, TackResult, TranslateError};
