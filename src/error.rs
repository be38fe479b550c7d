use thiserror::Error;

/// Errors that the parsing core propagates to the caller.
///
/// Everything else (odd-but-valid JSON shapes, empty containers, mixed-type
/// arrays) degrades to nulls or String columns instead of failing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Nesting deeper than the configured guard. Raised instead of letting
    /// recursion run into the host stack limit.
    #[error("maximum nesting depth {limit} exceeded")]
    DepthExceeded { limit: usize },
}
