use thiserror::Error;

/// Errors surfaced across the public solve() boundary.
///
/// Only `InvalidInput` is ever returned as `Err` from [`crate::solve::solve`];
/// every other failure mode (resource exhaustion, timeout, a transform
/// violating its purity/bound contract) is contained inside a single solve
/// call and converted into an empty or partial answer list instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl SolveError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
