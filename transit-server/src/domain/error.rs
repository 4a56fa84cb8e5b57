//! Domain error types.
//!
//! `NoPathFound` is the only domain error. It is always caught at the
//! orchestrator boundary and converted into the walk-only fallback, so it
//! never surfaces to a caller as a failure.

/// Route calculation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// No feasible combination of access walk, transit and egress walk.
    #[error("no feasible path: {0}")]
    NoPathFound(&'static str),
}
