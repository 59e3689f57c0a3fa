//! Top-level error type returned by the embedding API (`parse`/`evaluate`/`query`).
//!
//! Subsystems each keep their own error enum (`LexError`, `ParseError`, `EvalError`,
//! `GardenWallError`); this module composes them into the five-way taxonomy a caller of the
//! language actually needs to branch on.

use crate::evaluator::EvalError;
use crate::gardenwall::GardenWallError;
use crate::parser::ParseError;

/// The five non-recoverable error kinds a query can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Syntax,
    Reference,
    Type,
    Runtime,
    Internal,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Syntax => "syntax error",
            Kind::Reference => "reference error",
            Kind::Type => "type error",
            Kind::Runtime => "runtime error",
            Kind::Internal => "internal error",
        };
        write!(f, "{s}")
    }
}

/// The single error type surfaced by `query()` and by the CLI.
#[derive(Debug, Clone)]
pub struct QueryError {
    pub kind: Kind,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        QueryError { kind, message: message.into() }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::new(Kind::Syntax, e.to_string())
    }
}

impl From<EvalError> for QueryError {
    fn from(e: EvalError) -> Self {
        let kind = match &e {
            EvalError::Reference(_) => Kind::Reference,
            EvalError::Type(_) => Kind::Type,
            EvalError::Runtime(_) => Kind::Runtime,
            EvalError::Internal(_) => Kind::Internal,
        };
        QueryError::new(kind, e.to_string())
    }
}

impl From<GardenWallError> for QueryError {
    fn from(e: GardenWallError) -> Self {
        QueryError::new(Kind::Runtime, e.to_string())
    }
}
