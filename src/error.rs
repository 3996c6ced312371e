//! Error types for phash-eval operations.

use thiserror::Error;

/// Result type alias for phash-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hashing and evaluating images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An input image could not be decoded or is malformed.
    #[error("Image read failed: {source_id}: {reason}")]
    ImageRead {
        /// Identifier of the image (usually its path).
        source_id: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Configuration value out of range or unrecognized.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two fingerprints of different bit length were combined.
    #[error("Fingerprint size mismatch: expected {expected} bits, got {actual} bits")]
    SizeMismatch {
        /// Bit length of the first fingerprint.
        expected: usize,
        /// Bit length of the offending fingerprint.
        actual: usize,
    },

    /// An aggregation or evaluation was given nothing to work on.
    #[error("Empty set: {0}")]
    EmptySet(String),

    /// A fingerprint token could not be parsed.
    #[error("Invalid fingerprint token: {0}")]
    InvalidToken(String),

    /// A sample file name does not follow `modifier-value-name`.
    #[error("Invalid sample name: {0}")]
    InvalidSampleName(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether evaluation can continue after dropping the offending image.
    ///
    /// Only per-image read failures are recoverable; everything else aborts
    /// the enclosing group.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ImageRead { .. })
    }

    pub(crate) fn image_read(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImageRead {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }
}
