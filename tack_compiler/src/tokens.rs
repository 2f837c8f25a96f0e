//! Tokens
use smol_str::SmolStr;
use std::fmt;

/// One classified lexical unit.
///
/// Tokens are immutable once produced; the parser consumes them by
/// index through a [`TokenStream`](crate::token_stream::TokenStream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String constants are stored with
    /// their enclosing quotes already stripped.
    pub text: SmolStr,
    pub pos: Pos,
}

impl Token {
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    #[inline]
    pub fn is_sym(&self, sym: Sym) -> bool {
        self.kind == TokenKind::Sym(sym)
    }
}

/// Line and column of a token in the source text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier in the set of reserved words.
    Keyword(Keyword),
    /// Punctuation and operators.
    Sym(Sym),
    /// Integer literal.
    IntConst,
    /// Double-quoted string literal.
    StrConst,
    Ident,
}

impl TokenKind {
    /// Tag name used when echoing the token into the syntax tree.
    pub fn tag(&self) -> &'static str {
        match self {
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Sym(_) => "symbol",
            TokenKind::IntConst => "integerConstant",
            TokenKind::StrConst => "stringConstant",
            TokenKind::Ident => "identifier",
        }
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // Declarations
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,

    // Types
    Int,
    Char,
    Boolean,
    Void,

    // Constants
    True,
    False,
    Null,
    This,

    // Statements
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        };
        f.write_str(name)
    }
}

/// Punctuation and operator symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Sym {
    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Dot,      // .
    Comma,    // ,
    Semi,     // ;
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Amp,      // &
    Pipe,     // |
    Lt,       // <
    Gt,       // >
    Eq,       // =
    Tilde,    // ~
}

impl Sym {
    #[rustfmt::skip]
    pub fn parse(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::LBrace),
            '}' => Some(Self::RBrace),
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            '[' => Some(Self::LBracket),
            ']' => Some(Self::RBracket),
            '.' => Some(Self::Dot),
            ',' => Some(Self::Comma),
            ';' => Some(Self::Semi),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Star),
            '/' => Some(Self::Slash),
            '&' => Some(Self::Amp),
            '|' => Some(Self::Pipe),
            '<' => Some(Self::Lt),
            '>' => Some(Self::Gt),
            '=' => Some(Self::Eq),
            '~' => Some(Self::Tilde),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_char(self) -> char {
        match self {
            Self::LBrace   => '{',
            Self::RBrace   => '}',
            Self::LParen   => '(',
            Self::RParen   => ')',
            Self::LBracket => '[',
            Self::RBracket => ']',
            Self::Dot      => '.',
            Self::Comma    => ',',
            Self::Semi     => ';',
            Self::Plus     => '+',
            Self::Minus    => '-',
            Self::Star     => '*',
            Self::Slash    => '/',
            Self::Amp      => '&',
            Self::Pipe     => '|',
            Self::Lt       => '<',
            Self::Gt       => '>',
            Self::Eq       => '=',
            Self::Tilde    => '~',
        }
    }

    /// Operators valid between two terms of an expression.
    ///
    /// `-` doubles as unary negation when it occurs at a term-starting
    /// position; that disambiguation lives in the term compiler.
    #[inline]
    pub fn is_binary_op(self) -> bool {
        matches!(
            self,
            Sym::Plus
                | Sym::Minus
                | Sym::Star
                | Sym::Slash
                | Sym::Amp
                | Sym::Pipe
                | Sym::Lt
                | Sym::Gt
                | Sym::Eq
        )
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
