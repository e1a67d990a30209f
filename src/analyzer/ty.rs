use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::Symbol;
use crate::parser::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    IntPtr,
}

impl Type {
    /// Reads a `type INT` / `type INT STAR` node.
    pub fn from_node(node: &Node) -> Result<Self> {
        match node.rhs() {
            [Symbol::Int] => Ok(Type::Int),
            [Symbol::Int, Symbol::Star] => Ok(Type::IntPtr),
            _ => Err(Error::Malformed(Symbol::Type)),
        }
    }

    pub fn is_pointer(self) -> bool {
        self == Type::IntPtr
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::IntPtr => write!(f, "int*"),
        }
    }
}

/// Numeric literals must fit a signed 32-bit word.
pub fn literal_value(lexeme: &str) -> Result<i32> {
    lexeme
        .parse()
        .map_err(|_| Error::Range(lexeme.to_string()))
}
