//! Compiler that lowers a small object-oriented language to stack
//! machine code.
//!
//! Compilation is a single pass over the token stream. Alongside the
//! instructions the compiler echoes every consumed token into a tagged
//! syntax tree, which downstream tooling uses to inspect the parse.
pub mod charmap;
pub mod echo;
pub mod engine;
pub mod error;
pub mod labels;
pub mod lex;
pub mod symbol;
pub mod token_stream;
pub mod tokens;
pub mod vm_writer;

pub use engine::{Compiled, Compiler};
pub use error::{CompileError, CompileResult};

/// Compile a source unit in one call.
pub fn compile_str(source: &str) -> CompileResult<Compiled> {
    let tokens = lex::tokenize(source)?;
    Compiler::new(tokens).compile()
}
