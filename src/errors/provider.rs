//! Error types for external geocoding and routing providers.

/// Errors from the HTTP providers (Nominatim geocoding, OSRM routing).
///
/// Provider failures are expected outcomes: the geocode resolver swallows
/// them per query variant and the edge resolver maps them to its typed
/// payloads. Nothing in this enum should abort a client-tier caller.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or transport failure talking to the provider.
    #[error("Provider request failed: {details}")]
    Http {
        /// Description of the failed request
        details: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned status {status}: {details}")]
    Status {
        /// HTTP status code returned
        status: u16,
        /// Response body or reason phrase, truncated for logging
        details: String,
    },

    /// The provider response could not be decoded.
    #[error("Provider response parse error: {details}")]
    Parse {
        /// Details about the decode failure
        details: String,
        /// The underlying decode error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The routing provider found no route between the waypoints.
    #[error("No route found between the requested waypoints")]
    NoRoute,
}

impl ProviderError {
    /// Create an `Http` error from a transport failure.
    pub fn http(details: impl Into<String>, source: reqwest::Error) -> Self {
        ProviderError::Http {
            details: details.into(),
            source,
        }
    }

    /// Create a `Status` error from a non-success response.
    pub fn status(status: u16, details: impl Into<String>) -> Self {
        ProviderError::Status {
            status,
            details: details.into(),
        }
    }

    /// Create a `Parse` error from any decode failure.
    pub fn parse(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Parse {
            details: details.into(),
            source: Box::new(source),
        }
    }
}
