use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::Symbol;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: Symbol,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: Symbol, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }

    pub fn bof() -> Self {
        Self::new(Symbol::Bof, "BOF")
    }

    pub fn eof() -> Self {
        Self::new(Symbol::Eof, "EOF")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.lexeme)
    }
}

/// Reads the lexer's output format: one `KIND lexeme` pair per line.
pub fn read_tokens(text: &str) -> Result<Vec<Token>> {
    let mut tokens = vec![];

    for (i, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(kind) = fields.next() else {
            continue;
        };
        let kind = match Symbol::from_name(kind) {
            Some(kind) if kind.is_terminal() => kind,
            _ => return Err(Error::load(i + 1, format!("unknown token kind {kind}"))),
        };
        let lexeme = fields.next().unwrap_or_default();
        tokens.push(Token::new(kind, lexeme));
    }

    Ok(tokens)
}
