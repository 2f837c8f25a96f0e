//! Compiler error type
use crate::{lex::LexError, tokens::{Pos, Token}};

use smol_str::SmolStr;
use std::{error, fmt};

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Token sequence does not match the grammar.
    Syntax {
        expected: String,
        found: Option<Token>,
    },
    /// Identifier used as a variable but declared in no visible scope.
    UnresolvedIdentifier { name: SmolStr, pos: Pos },
    /// Same name declared twice in one scope.
    DuplicateSymbol { name: SmolStr, pos: Pos },
    /// Character in a string constant with no runtime character code.
    MalformedCharacter { ch: char, pos: Pos },
    Lex(LexError),
}

impl CompileError {
    pub fn syntax(expected: impl fmt::Display, found: Option<Token>) -> Self {
        CompileError::Syntax {
            expected: expected.to_string(),
            found,
        }
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CompileError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CompileError as E;
        match self {
            E::Syntax { expected, found } => match found {
                Some(token) => write!(
                    f,
                    "syntax error at {}: expected {}, found '{}'",
                    token.pos, expected, token.text
                ),
                None => write!(
                    f,
                    "syntax error: expected {}, found end of input",
                    expected
                ),
            },
            E::UnresolvedIdentifier { name, pos } => {
                write!(f, "unresolved identifier '{}' at {}", name, pos)
            }
            E::DuplicateSymbol { name, pos } => {
                write!(f, "duplicate symbol '{}' at {}", name, pos)
            }
            E::MalformedCharacter { ch, pos } => {
                write!(f, "character {:?} at {} has no character code", ch, pos)
            }
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}
