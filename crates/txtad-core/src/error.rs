//! Error types for the rule engine.

use thiserror::Error;

/// Result type for expression evaluation.
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// An arithmetic or comparison operand is not an integer.
    #[error("not a number: {0:?}")]
    NotANumber(String),

    /// A list operand is missing its brackets.
    #[error("malformed list: {0:?}")]
    MalformedList(String),

    /// Integer division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

/// Errors raised while building or driving the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A listener or entry-condition pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern as written in the content.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// Expression evaluation failed.
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// The event queue was still non-empty after the drain cap.
    #[error("turn did not converge after {rounds} rounds (pending: {pending:?})")]
    DidNotConverge {
        /// Number of drain rounds executed.
        rounds: usize,
        /// Events still queued when the cap was hit.
        pending: String,
    },
}
