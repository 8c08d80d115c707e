/// Convenience result type used across shotframe.
pub type ShotResult<T> = Result<T, ShotError>;

/// Top-level error taxonomy used by compositor, loader and session APIs.
#[derive(thiserror::Error, Debug)]
pub enum ShotError {
    /// Invalid template, style or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Asset bytes could not be obtained (file, network or data URI).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Bytes were obtained but could not be decoded into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// Font bytes could not be registered.
    #[error("font error: {0}")]
    Font(String),

    /// Rasterization or surface invariant failure.
    #[error("render error: {0}")]
    Render(String),

    /// The render pass was superseded by a newer request.
    #[error("render pass cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShotError {
    /// Build a [`ShotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShotError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`ShotError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ShotError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`ShotError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for errors caused by a superseded pass.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
