//! Result and errors.
use std::fmt::{self, Display, Formatter};

pub type TackResult<T> = std::result::Result<T, TackError>;

#[derive(Debug)]
pub enum TackError {
    Translate(TranslateError),
    Asm(AsmError),
}

impl Display for TackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate(err) => write!(f, "{}", err),
            Self::Asm(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TackError {}

impl From<TranslateError> for TackError {
    fn from(err: TranslateError) -> Self {
        TackError::Translate(err)
    }
}

impl From<AsmError> for TackError {
    fn from(err: AsmError) -> Self {
        TackError::Asm(err)
    }
}

/// Error while translating stack machine code to assembly.
#[derive(Debug)]
pub struct TranslateError {
    /// 1-based line in the stack machine source.
    pub line: usize,
    pub message: String,
}

impl TranslateError {
    pub fn new(line: usize, message: impl ToString) -> Self {
        Self {
            line,
            message: message.to_string(),
        }
    }
}

impl Display for TranslateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "translate error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TranslateError {}

/// Error while assembling to binary words.
#[derive(Debug)]
pub struct AsmError {
    /// 1-based line in the assembly source.
    pub line: usize,
    pub message: String,
}

impl AsmError {
    pub fn new(line: usize, message: impl ToString) -> Self {
        Self {
            line,
            message: message.to_string(),
        }
    }
}

impl Display for AsmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "assembly error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AsmError {}
