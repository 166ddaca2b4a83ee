/// Convenience result type used across lumatile.
pub type LumatileResult<T> = Result<T, LumatileError>;

/// Top-level error taxonomy for setup-time APIs.
///
/// Per-pixel reads never return errors: numeric edge cases and out-of-bounds coordinates are
/// clamped in place, and contract violations (reading outside an execution pass) panic.
#[derive(thiserror::Error, Debug)]
pub enum LumatileError {
    /// Invalid user-provided data: buffer shapes, rects, socket wiring, options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while driving an execution pass (lifecycle misuse, unconnected inputs).
    #[error("execution error: {0}")]
    Execution(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LumatileError {
    /// Build a [`LumatileError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LumatileError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Build a [`LumatileError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
