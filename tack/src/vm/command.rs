//! Stack machine command vocabulary.
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    #[rustfmt::skip]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "constant" => Some(Self::Constant),
            "local"    => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this"     => Some(Self::This),
            "that"     => Some(Self::That),
            "temp"     => Some(Self::Temp),
            "pointer"  => Some(Self::Pointer),
            "static"   => Some(Self::Static),
            _ => None,
        }
    }
}

impl Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constant => "constant",
            Self::Local    => "local",
            Self::Argument => "argument",
            Self::This     => "this",
            Self::That     => "that",
            Self::Temp     => "temp",
            Self::Pointer  => "pointer",
            Self::Static   => "static",
        };
        f.write_str(name)
    }
}

/// One parsed stack machine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(Segment, u16),
    Pop(Segment, u16),
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    /// Parse a single non-empty source line. Error messages carry no
    /// line number; the caller attaches it.
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let head = match words.next() {
            Some(word) => word,
            None => return Err("empty command".to_string()),
        };

        let command = match head {
            "push" | "pop" => {
                let segment = words
                    .next()
                    .and_then(Segment::parse)
                    .ok_or_else(|| format!("'{}' expects a segment name", head))?;
                let index = words
                    .next()
                    .and_then(|word| word.parse::<u16>().ok())
                    .ok_or_else(|| format!("'{}' expects a numeric index", head))?;

                if head == "push" {
                    Command::Push(segment, index)
                } else {
                    if segment == Segment::Constant {
                        return Err("cannot pop to the constant segment".to_string());
                    }
                    Command::Pop(segment, index)
                }
            }
            "add" => Command::Add,
            "sub" => Command::Sub,
            "neg" => Command::Neg,
            "eq" => Command::Eq,
            "gt" => Command::Gt,
            "lt" => Command::Lt,
            "and" => Command::And,
            "or" => Command::Or,
            "not" => Command::Not,
            "label" | "goto" | "if-goto" => {
                let target = words
                    .next()
                    .ok_or_else(|| format!("'{}' expects a label name", head))?
                    .to_string();
                match head {
                    "label" => Command::Label(target),
                    "goto" => Command::Goto(target),
                    _ => Command::IfGoto(target),
                }
            }
            "function" | "call" => {
                let name = words
                    .next()
                    .ok_or_else(|| format!("'{}' expects a function name", head))?
                    .to_string();
                let count = match words.next() {
                    Some(word) => word
                        .parse::<u16>()
                        .map_err(|_| format!("'{}' expects a numeric count", head))?,
                    None => 0,
                };
                if head == "function" {
                    Command::Function {
                        name,
                        locals: count,
                    }
                } else {
                    Command::Call { name, args: count }
                }
            }
            "return" => Command::Return,
            _ => return Err(format!("unknown command '{}'", head)),
        };

        if let Some(extra) = words.next() {
            return Err(format!("unexpected trailing word '{}'", extra));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_push_pop() {
        assert_eq!(
            Command::parse("push constant 7"),
            Ok(Command::Push(Segment::Constant, 7))
        );
        assert_eq!(
            Command::parse("pop local 2"),
            Ok(Command::Pop(Segment::Local, 2))
        );
        assert!(Command::parse("pop constant 1").is_err());
        assert!(Command::parse("push bogus 1").is_err());
        assert!(Command::parse("push local").is_err());
    }

    #[test]
    fn test_parse_flow() {
        assert_eq!(
            Command::parse("if-goto Main_0"),
            Ok(Command::IfGoto("Main_0".to_string()))
        );
        assert_eq!(
            Command::parse("function Main.main 2"),
            Ok(Command::Function {
                name: "Main.main".to_string(),
                locals: 2
            })
        );
        // The count defaults to zero when omitted.
        assert_eq!(
            Command::parse("call Sys.init"),
            Ok(Command::Call {
                name: "Sys.init".to_string(),
                args: 0
            })
        );
    }

    #[test]
    fn test_parse_trailing_garbage() {
        assert!(Command::parse("add extra").is_err());
    }
}
