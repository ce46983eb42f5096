use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Syntax(String),
    #[error("Unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("Ragged matrix literal: rows must have equal length")]
    RaggedMatrix,
    #[error("Empty input")]
    Empty,
}
