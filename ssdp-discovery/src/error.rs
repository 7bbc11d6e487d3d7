//! Error types for the discovery system.

use crate::headers::HeaderMap;

/// Error type for discovery operations.
///
/// Receive timeouts never surface here: running out of time ends a search
/// normally by exhausting its iterator.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Socket creation, bind, multicast group join, or a non-timeout receive failure
    #[error("Transport error during {operation}: {source}")]
    Transport {
        /// The socket operation that failed
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A received datagram was not valid UTF-8 text
    #[error("Decode error: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Decoded headers lack a header suitable for a required field
    #[error("Validation error: no header suitable for \"{field}\" in {headers:?}")]
    Validation {
        /// The required field that could not be resolved
        field: &'static str,
        /// The headers that were received
        headers: HeaderMap,
    },

    /// Invalid search options
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DiscoveryError {
    pub(crate) fn transport(operation: &'static str, source: std::io::Error) -> Self {
        DiscoveryError::Transport { operation, source }
    }
}

/// Convenience Result type alias for discovery operations.
///
/// Equivalent to `std::result::Result<T, DiscoveryError>`.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
