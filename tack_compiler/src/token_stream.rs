//! Cursor over the token buffer produced by the lexer.
use crate::{
    error::{CompileError, CompileResult},
    tokens::{Keyword, Sym, Token, TokenKind},
};

pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// Lookahead without consuming. Offset 0 is the next token.
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    /// The unconsumed tail of the buffer.
    #[inline]
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.cursor.min(self.tokens.len())..]
    }

    pub fn advance(&mut self) -> CompileResult<Token> {
        match self.tokens.get(self.cursor) {
            Some(token) => {
                let token = token.clone();
                self.cursor += 1;
                Ok(token)
            }
            None => Err(CompileError::syntax("a token", None)),
        }
    }

    #[inline]
    pub fn peek_sym(&self) -> Option<Sym> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Sym(sym),
                ..
            }) => Some(*sym),
            _ => None,
        }
    }

    #[inline]
    pub fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Keyword(keyword),
                ..
            }) => Some(*keyword),
            _ => None,
        }
    }

    pub fn expect_sym(&mut self, sym: Sym) -> CompileResult<Token> {
        if self.peek_sym() == Some(sym) {
            self.advance()
        } else {
            Err(CompileError::syntax(
                format!("'{}'", sym),
                self.peek().cloned(),
            ))
        }
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        if self.peek_keyword() == Some(keyword) {
            self.advance()
        } else {
            Err(CompileError::syntax(
                format!("'{}'", keyword),
                self.peek().cloned(),
            ))
        }
    }

    pub fn expect_ident(&mut self) -> CompileResult<Token> {
        let is_ident = matches!(
            self.peek(),
            Some(Token {
                kind: TokenKind::Ident,
                ..
            })
        );
        if is_ident {
            self.advance()
        } else {
            Err(CompileError::syntax("an identifier", self.peek().cloned()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    #[test]
    fn test_stream_walk() {
        let mut stream = TokenStream::new(tokenize("let x = 1;").unwrap());
        assert!(!stream.is_at_end());
        assert_eq!(stream.peek_keyword(), Some(Keyword::Let));
        assert_eq!(stream.peek_at(2).map(|t| t.text.as_str()), Some("="));

        stream.expect_keyword(Keyword::Let).unwrap();
        let name = stream.expect_ident().unwrap();
        assert_eq!(name.text.as_str(), "x");
        stream.expect_sym(Sym::Eq).unwrap();
        stream.advance().unwrap();
        stream.expect_sym(Sym::Semi).unwrap();
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_stream_expect_mismatch() {
        let mut stream = TokenStream::new(tokenize("let").unwrap());
        let err = stream.expect_sym(Sym::Semi).unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
        // The mismatched token is not consumed.
        assert_eq!(stream.peek_keyword(), Some(Keyword::Let));
    }

    #[test]
    fn test_stream_advance_past_end() {
        let mut stream = TokenStream::new(vec![]);
        assert!(stream.advance().is_err());
    }
}
