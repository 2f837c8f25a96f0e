//! Tagged syntax tree echo.
//!
//! Mirrors every consumed token and grammar production into a nested
//! tag format, produced in the same pass as code generation.
use crate::tokens::Token;

/// Accumulates the tagged tree as flat text.
#[derive(Debug, Default)]
pub struct SyntaxEcho {
    out: String,
}

impl SyntaxEcho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a production tag, e.g. `<letStatement>`.
    pub fn open(&mut self, production: &str) {
        self.out.push('<');
        self.out.push_str(production);
        self.out.push_str(">\n");
    }

    /// Close a production tag, e.g. `</letStatement>`.
    pub fn close(&mut self, production: &str) {
        self.out.push_str("</");
        self.out.push_str(production);
        self.out.push_str(">\n");
    }

    /// Echo one consumed token as `<tag> text </tag>`.
    pub fn token(&mut self, token: &Token) {
        let tag = token.kind.tag();
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str("> ");
        escape_into(&mut self.out, &token.text);
        self.out.push_str(" </");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Escape markup-significant characters in token text.
fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    #[test]
    fn test_echo_tokens_and_productions() {
        let tokens = tokenize("let x = 1;").unwrap();
        let mut echo = SyntaxEcho::new();
        echo.open("letStatement");
        for token in &tokens {
            echo.token(token);
        }
        echo.close("letStatement");

        assert_eq!(
            echo.finish(),
            "<letStatement>\n\
             <keyword> let </keyword>\n\
             <identifier> x </identifier>\n\
             <symbol> = </symbol>\n\
             <integerConstant> 1 </integerConstant>\n\
             <symbol> ; </symbol>\n\
             </letStatement>\n"
        );
    }

    #[test]
    fn test_echo_escapes_operators() {
        let tokens = tokenize("a < b & c").unwrap();
        let mut echo = SyntaxEcho::new();
        for token in &tokens {
            echo.token(token);
        }
        let text = echo.finish();
        assert!(text.contains("<symbol> &lt; </symbol>"));
        assert!(text.contains("<symbol> &amp; </symbol>"));
    }
}
