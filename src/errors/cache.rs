//! Error types for the durable cache tiers and stores.

/// Errors from disk-backed cache and store operations.
///
/// Durable-tier failures never propagate as hard errors on a primary path:
/// reads degrade to a cache miss and writes are best-effort. This type exists
/// so the degradation sites can log something structured.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Error reading from or writing to a cache file.
    #[error("Cache I/O error at {path}: {details}")]
    Io {
        /// Path to the file that caused the error
        path: String,
        /// Details about the I/O error
        details: String,
        /// The underlying I/O error, if available
        #[source]
        source: Option<std::io::Error>,
    },

    /// Error serializing or deserializing cached data.
    #[error("Cache serialization error: {details}")]
    Serialization {
        /// Details about the serialization error
        details: String,
        /// The underlying serialization error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CacheError {
    /// Create an `Io` error for a path.
    pub fn io_error(
        path: impl Into<String>,
        details: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        CacheError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error from any serde failure.
    pub fn serialization_error(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CacheError::Serialization {
            details: details.into(),
            source: Box::new(source),
        }
    }
}
