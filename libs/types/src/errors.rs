//! Error taxonomy
//!
//! The matching core itself defines no error cases; everything here
//! belongs to the boundaries around it. Degenerate matching inputs come
//! back as empty trade lists, and `NoLiquidity` is a status, not an error.

use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed request shape: missing field, bad enum, non-positive
    /// numeric. Never logged to the WAL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Cancel or lookup for an id nothing owns.
    #[error("unknown order: {0}")]
    UnknownOrder(String),

    /// Lookup for a symbol with no book.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Startup cannot proceed: WAL unopenable or replay failed.
    #[error("fatal: {0}")]
    Fatal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidRequest("missing field: symbol".into());
        assert_eq!(err.to_string(), "invalid request: missing field: symbol");

        let err = EngineError::UnknownOrder("ORD-9".into());
        assert_eq!(err.to_string(), "unknown order: ORD-9");
    }
}
