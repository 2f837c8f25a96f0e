//! Lexical analysis (tokenizer)
use crate::tokens::{Keyword, Pos, Sym, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt, str::CharIndices};

/// Tokenize a whole source unit.
///
/// Comments and whitespace are stripped. The returned tokens are in
/// source order, each tagged with its line and column.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];

    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    Ok(tokens)
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    source: SourceText<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
        }
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Returns `None` once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let (index, c, pos) = match self.source.next_char() {
                Some(next) => next,
                None => return Ok(None),
            };

            match c {
                c if c.is_whitespace() => continue,
                '/' => match self.source.peek_char() {
                    Some('/') => self.consume_line_comment(),
                    Some('*') => self.consume_block_comment(pos)?,
                    _ => return Ok(Some(self.sym_token(Sym::Slash, pos))),
                },
                '"' => return self.consume_string(index, pos).map(Some),
                '0'..='9' => return Ok(Some(self.consume_number(index, pos))),
                '_' | 'a'..='z' | 'A'..='Z' => return Ok(Some(self.consume_ident(index, pos))),
                c => match Sym::parse(c) {
                    Some(sym) => return Ok(Some(self.sym_token(sym, pos))),
                    None => return Err(LexError::UnknownCharacter(c, pos)),
                },
            }
        }
    }

    fn sym_token(&self, sym: Sym, pos: Pos) -> Token {
        let mut text = [0u8; 4];
        Token {
            kind: TokenKind::Sym(sym),
            text: sym.as_char().encode_utf8(&mut text).into(),
            pos,
        }
    }

    /// Erase a `//` comment up to, but not including, the trailing newline.
    fn consume_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a `/* ... */` comment, newlines included.
    fn consume_block_comment(&mut self, start: Pos) -> Result<(), LexError> {
        loop {
            match self.source.next_char() {
                Some((_, '*', _)) => {
                    if let Some('/') = self.source.peek_char() {
                        self.source.next_char();
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment(start)),
            }
        }
    }

    /// Make a string constant token. The opening quote has been consumed;
    /// the stored text excludes both quotes.
    fn consume_string(&mut self, quote_index: usize, pos: Pos) -> Result<Token, LexError> {
        loop {
            match self.source.next_char() {
                Some((index, '"', _)) => {
                    let text = &self.source.original[quote_index + 1..index];
                    return Ok(Token {
                        kind: TokenKind::StrConst,
                        text: text.into(),
                        pos,
                    });
                }
                Some((_, '\n', _)) | None => return Err(LexError::UnterminatedString(pos)),
                Some(_) => {}
            }
        }
    }

    /// Make an integer constant token.
    fn consume_number(&mut self, start: usize, pos: Pos) -> Token {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        Token {
            kind: TokenKind::IntConst,
            text: self.source.fragment_from(start).into(),
            pos,
        }
    }

    /// Make an identifier or keyword token.
    fn consume_ident(&mut self, start: usize, pos: Pos) -> Token {
        while let Some(c) = self.source.peek_char() {
            match c {
                '_' | 'a'..='z' | 'A'..='Z' | '0'..='9' => {
                    self.source.next_char();
                }
                _ => break,
            }
        }

        let fragment = self.source.fragment_from(start);
        let kind = match Keyword::parse(fragment) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        Token {
            kind,
            text: fragment.into(),
            pos,
        }
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    /// Keep a reference to the source so tokens can slice
    /// fragments from it.
    original: &'a str,

    /// Iterator over UTF-8 encoded source code. The `MultiPeek`
    /// wrapper buffers lookahead because characters are variable
    /// in width.
    chars: MultiPeek<CharIndices<'a>>,

    /// Byte position and value of the most recently consumed character.
    current: (usize, char),
    line: u32,
    column: u32,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            current: (0, '\0'),
            line: 1,
            column: 1,
        }
    }

    /// Advance the cursor, returning the consumed character together
    /// with its byte index and source position.
    fn next_char(&mut self) -> Option<(usize, char, Pos)> {
        self.chars.reset_peek();
        let (index, c) = self.chars.next()?;

        let pos = Pos {
            line: self.line,
            column: self.column,
        };
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.current = (index, c);

        Some((index, c, pos))
    }

    /// Look at the next character without consuming it.
    ///
    /// Peeking is not idempotent; each call advances an internal peek
    /// cursor which `next_char` resets.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Slice from `start` through the most recently consumed character.
    fn fragment_from(&self, start: usize) -> &'a str {
        let end = self.current.0 + self.current.1.len_utf8();
        &self.original[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Character outside the source language's alphabet.
    UnknownCharacter(char, Pos),
    /// A string constant running past the end of its line.
    UnterminatedString(Pos),
    /// A `/*` comment with no closing `*/`.
    UnterminatedComment(Pos),
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LexError as E;
        match self {
            E::UnknownCharacter(c, pos) => write!(f, "unknown character {:?} at {}", c, pos),
            E::UnterminatedString(pos) => write!(f, "unterminated string constant at {}", pos),
            E::UnterminatedComment(pos) => write!(f, "unterminated comment at {}", pos),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_lex_statement() {
        let tokens = tokenize("let sum = 5;").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["let", "sum", "=", "5", ";"]);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Keyword(Keyword::Let),
            "reserved words are classified as keywords"
        );
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::IntConst);
    }

    #[test]
    fn test_lex_string_constant() {
        let tokens = tokenize("let s = \"AB\";").unwrap();
        assert_eq!(tokens[3].kind, TokenKind::StrConst);
        assert_eq!(tokens[3].text.as_str(), "AB", "quotes are stripped");
    }

    #[test]
    fn test_lex_comments_stripped() {
        let source = "// leading\nlet x = 1; // trailing\n/* block\n comment */ return;";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident,
                TokenKind::Sym(Sym::Eq),
                TokenKind::IntConst,
                TokenKind::Sym(Sym::Semi),
                TokenKind::Keyword(Keyword::Return),
                TokenKind::Sym(Sym::Semi),
            ]
        );
    }

    #[test]
    fn test_lex_slash_is_division() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::Ident,
                TokenKind::Sym(Sym::Slash),
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn test_lex_positions() {
        let tokens = tokenize("let x;\nlet y;").unwrap();
        assert_eq!(tokens[0].pos, Pos { line: 1, column: 1 });
        assert_eq!(tokens[1].pos, Pos { line: 1, column: 5 });
        assert_eq!(tokens[3].pos, Pos { line: 2, column: 1 });
    }

    #[test]
    fn test_lex_unknown_character() {
        match tokenize("let x = 1 ? 2;") {
            Err(LexError::UnknownCharacter('?', _)) => {}
            other => panic!("expected unknown character error, got {:?}", other),
        }
    }

    #[test]
    fn test_lex_unterminated_string() {
        assert!(matches!(
            tokenize("let s = \"oops"),
            Err(LexError::UnterminatedString(_))
        ));
    }
}
