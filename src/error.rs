//! Error types for the lab report parser.
//!
//! This module defines all error types that can occur while turning positioned
//! text into structured lab fields.

/// Result type alias for lab report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during lab report processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A fragment stream handed to the association engine is not in reading order
    #[error("Unordered {stream} stream: fragment {position} breaks reading order")]
    UnorderedStream {
        /// Which stream was checked ("labels" or "data")
        stream: &'static str,
        /// Index of the first fragment that sorts before its predecessor
        position: usize,
    },

    /// Comparator symbol outside the one-sided interval vocabulary
    #[error("Unknown comparator: '{0}'")]
    UnknownComparator(String),

    /// Bounding box with inverted edges
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
