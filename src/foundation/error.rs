/// Convenience result type used across pixcomp.
pub type PixcompResult<T> = Result<T, PixcompError>;

/// Top-level error taxonomy used by compositing APIs.
///
/// Degenerate but well-formed input (zero-radius gradients, fully clipped
/// rectangles, gradients without stops) is never an error; it resolves to
/// transparent pixels or a no-op.
#[derive(thiserror::Error, Debug)]
pub enum PixcompError {
    /// The caller broke an entry contract. Reported before any pixel is written.
    #[error("contract violation: {0}")]
    Contract(String),

    /// Scratch or cache allocation failed, or a pixel buffer lock was poisoned.
    #[error("resource exhausted: {0}")]
    Resource(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixcompError {
    /// Build a [`PixcompError::Contract`] value.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Build a [`PixcompError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
