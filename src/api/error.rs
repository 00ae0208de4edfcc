//! Transport error types

use thiserror::Error;

/// Errors raised while exchanging a request with the remote service.
///
/// Every failure to complete an exchange collapses into [`TransportError::Network`];
/// the service's own rejections arrive as ordinary responses with a `message`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange could not complete (DNS, connection, TLS) or the body
    /// was not structured data
    #[error("Network error: {0}")]
    Network(String),

    /// The configured base URL cannot be combined with a request path
    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),
}

impl TransportError {
    /// Create a network error from any displayable cause
    pub fn network(cause: impl std::fmt::Display) -> Self {
        TransportError::Network(cause.to_string())
    }

    /// Check if this error came from the network layer
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}
