/// Convenience result type used across the renderer.
pub type RenderResult<T> = Result<T, RenderError>;

/// Error taxonomy of the rendering layer.
///
/// Query surfaces (`touching_*`, `color_at_*`, bounds) never return these: they log and fall back
/// to a neutral value. Construction and GPU plumbing propagate them.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Invalid caller-provided data (sizes, ids, option values).
    #[error("validation error: {0}")]
    Validation(String),

    /// A GPU resource is unavailable: invalid texture, incomplete framebuffer, failed compile.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Costume bytes could not be decoded or rasterized.
    #[error("decode error: {0}")]
    Decode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderError {
    /// Build a [`RenderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`RenderError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
