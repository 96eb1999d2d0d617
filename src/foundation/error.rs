pub type PixcelResult<T> = Result<T, PixcelError>;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by every conversion entry point.
///
/// Every variant is terminal for the conversion call that produced it; nothing in the
/// crate retries.
pub enum PixcelError {
    /// A grid or canvas has zero width or height.
    #[error("invalid dimensions (zero width or height)")]
    InvalidDimensions,

    /// An animated source contains no frames.
    #[error("animated source contains no frames")]
    NoFrames,

    /// Cooperative cancellation was observed mid-pass.
    #[error("conversion cancelled")]
    Cancelled,

    /// Malformed caller input (options, raw frame buffers).
    #[error("validation error: {0}")]
    Validation(String),

    /// Source bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The output sink failed; the underlying error is kept verbatim.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else, carrying an `anyhow` context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixcelError {
    /// Build a [`PixcelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixcelError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
