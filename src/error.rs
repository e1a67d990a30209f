use std::fmt;

use thiserror::Error;

use crate::analyzer::Type;
use crate::grammar::Symbol;

pub type Result<T> = std::result::Result<T, Error>;

/// The pass a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Processing,
    CodeGeneration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Setup => write!(f, "setup"),
            Stage::Processing => write!(f, "processing"),
            Stage::CodeGeneration => write!(f, "code generation"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Structural,
    Declaration,
    Resolution,
    Type,
    Range,
    Config,
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {reason}")]
    Load { line: usize, reason: String },
    #[error("no transition from state {state} on {symbol}")]
    Syntax { state: usize, symbol: Symbol },
    #[error("parse did not reduce to a single program (stack holds {0} nodes)")]
    Incomplete(usize),
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("numeric literal {0} is out of range")]
    Range(String),
    #[error("cell size must be at least 1, found {0}")]
    CellSize(i32),
    #[error("malformed tree: expected {0}")]
    Malformed(Symbol),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Load { .. } => ErrorKind::Load,
            Error::Syntax { .. } | Error::Incomplete(_) => ErrorKind::Structural,
            Error::Declaration(_) => ErrorKind::Declaration,
            Error::Resolution(_) => ErrorKind::Resolution,
            Error::Type(_) => ErrorKind::Type,
            Error::Range(_) => ErrorKind::Range,
            Error::CellSize(_) => ErrorKind::Config,
            Error::Malformed(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn load(line: usize, reason: impl Into<String>) -> Self {
        Error::Load {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("duplicate variable declaration: {0}")]
    DuplicateVariable(String),
    #[error("duplicate procedure declaration: {0}")]
    DuplicateProcedure(String),
    #[error("incorrect initializer in declaration of {ty} {name}")]
    Initializer { name: String, ty: Type },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("use of undeclared variable: {0}")]
    UndeclaredVariable(String),
    #[error("use of undeclared procedure: {0}")]
    UndeclaredProcedure(String),
    #[error("function call on local variable: {0}")]
    CallOnVariable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("'&' needs an int lvalue, found {0}")]
    AddressOf(Type),
    #[error("'*' needs an int* operand, found {0}")]
    Dereference(Type),
    #[error("'{op}' needs int operands, found {left} and {right}")]
    Multiplicative { op: Symbol, left: Type, right: Type },
    #[error("invalid operands to '{op}': {left} and {right}")]
    Additive { op: Symbol, left: Type, right: Type },
    #[error("'new int[]' needs an int size, found {0}")]
    Allocation(Type),
    #[error("{callee} expects {expected} arguments, found {found}")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of {callee} should be {expected}, found {found}")]
    ArgumentType {
        callee: String,
        position: usize,
        expected: Type,
        found: Type,
    },
    #[error("lvalue and expression must have the same type: {left} and {right}")]
    Assignment { left: Type, right: Type },
    #[error("expression derived from println must be of type int, found {0}")]
    Println(Type),
    #[error("expression derived from delete must be of type int*, found {0}")]
    Delete(Type),
    #[error("both sides of '{op}' must have the same type: {left} and {right}")]
    Test { op: Symbol, left: Type, right: Type },
    #[error("procedure {procedure} must return int, found {found}")]
    Return { procedure: String, found: Type },
    #[error("second parameter of wain must be int, found {0}")]
    EntryParameter(Type),
}

/// The first failure of a compilation, tagged with the pass that produced it.
#[derive(Debug, Error)]
#[error("ERROR in {stage}: {error}")]
pub struct CompileError {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl CompileError {
    pub fn new(stage: Stage, error: Error) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
