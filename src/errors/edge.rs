//! Error types for the consolidated edge route resolver.

/// Typed failure payload for the edge resolution contract.
///
/// This is the only component that surfaces failures to remote callers, so
/// every variant has a stable machine-readable code (see
/// [`EdgeError::code`]) and a transport status mapping in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// The request body was malformed or named fewer than two stops.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected
        reason: String,
    },

    /// No stored stop list matched the referenced bus.
    #[error("No stop list found for {reference}")]
    NotFound {
        /// The bus id or name that was looked up
        reference: String,
    },

    /// Fewer than two stops survived geocoding.
    #[error("Geocoding resolved only {resolved} of {requested} stops")]
    GeocodeInsufficient {
        /// Stops that resolved to coordinates
        resolved: usize,
        /// Stops requested
        requested: usize,
    },

    /// The routing provider produced no route for the waypoints.
    #[error("Routing unavailable: {details}")]
    RoutingUnavailable {
        /// Provider failure details
        details: String,
    },

    /// Unexpected failure; always caught, never an unhandled crash.
    #[error("Internal error: {details}")]
    Internal {
        /// What went wrong
        details: String,
    },
}

impl EdgeError {
    /// Create an `InvalidRequest` error with a reason.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        EdgeError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Create a `NotFound` error for a bus reference.
    pub fn not_found(reference: impl Into<String>) -> Self {
        EdgeError::NotFound {
            reference: reference.into(),
        }
    }

    /// Create an `Internal` error with details.
    pub fn internal(details: impl Into<String>) -> Self {
        EdgeError::Internal {
            details: details.into(),
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            EdgeError::InvalidRequest { .. } => "invalid_request",
            EdgeError::NotFound { .. } => "not_found",
            EdgeError::GeocodeInsufficient { .. } => "geocode_insufficient",
            EdgeError::RoutingUnavailable { .. } => "routing_unavailable",
            EdgeError::Internal { .. } => "internal",
        }
    }
}
