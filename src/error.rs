/// Crate-level error type for the rumble data-analysis library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Caller-provided storage has the wrong shape for the configuration.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Input data contains non-finite values (NaN or Inf).
    #[error("data contains non-finite values")]
    NonFiniteData,

    /// Frame-archive errors.
    #[error(transparent)]
    Archive(#[from] crate::frame::ArchiveError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for rumble operations.
pub type Result<T> = std::result::Result<T, Error>;
