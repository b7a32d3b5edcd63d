use thiserror::Error;

/// Errors surfaced by the simulation kernel.
///
/// Failures inside a sub-timestep abort the frame; there is no partial-frame
/// rollback, so a failed solver should be discarded rather than resumed.
#[derive(Debug, Error)]
pub enum FluidError {
    /// Caller-supplied input violates the documented contract (mismatched
    /// array lengths, non-positive frame interval).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, FluidError>;
