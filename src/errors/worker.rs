//! Error types for the geometry worker channel.

/// Errors from the geometry worker handle.
///
/// The worker itself is pure and cannot fail; the only failure mode is the
/// channel to a worker task that has shut down.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker task is no longer running.
    #[error("Geometry worker channel closed")]
    ChannelClosed,

    /// The worker answered with a response variant that does not pair with
    /// the request. Cannot happen while the dispatch table pairs variants
    /// one-to-one; kept so the typed accessors need no panic path.
    #[error("Geometry worker returned an unexpected response, expected {expected}")]
    UnexpectedResponse {
        /// The response variant the caller was waiting for
        expected: &'static str,
    },
}
