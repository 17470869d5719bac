//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// DNS-over-HTTPS error type.
///
/// Everything except [`InvalidName`](Self::InvalidName) is a transport-level
/// failure: the lookup could not be completed and should be retried later.
/// None of them means "the record does not exist".
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum DohError {
    /// The resolver could not be reached (connection refused, TLS failure, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout
    #[error("DNS lookup timed out: {0}")]
    Timeout(String),

    /// The resolver answered with a non-success HTTP status
    #[error("Resolver returned HTTP {0}")]
    HttpStatus(u16),

    /// The resolver answered with a DNS RCODE other than NOERROR/NXDOMAIN
    #[error("Resolver returned DNS status {0}")]
    ResolverStatus(u32),

    /// The response body is not a valid DNS JSON payload
    #[error("Malformed DNS response: {0}")]
    Decode(String),

    /// The domain name is not syntactically valid
    #[error("{0}")]
    InvalidName(String),
}

impl DohError {
    /// Whether the failure is transient and the same lookup may succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidName(_))
    }
}

/// DoH Result type alias
pub type DohResult<T> = std::result::Result<T, DohError>;
