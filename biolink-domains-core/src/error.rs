//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use biolink_domains_doh::DohError;

/// Core layer error type
///
/// Every message names the next corrective action, since most of these reach
/// the dashboard verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Bad domain or URL format, or an illegal state transition
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The domain is verified by another account
    #[error("{domain} is already connected to another account. Remove it there first or use a different domain")]
    DomainConflict { domain: String },

    /// DNS transport failure, safe to retry
    #[error("DNS lookup failed, try again in a moment: {0}")]
    TransientLookup(String),

    /// No persisted configuration for the account
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The account has no custom domain saved yet
    #[error("No custom domain configured for account {0}. Save a domain first")]
    DomainNotConfigured(String),

    /// The subscription plan does not include custom domains
    #[error("Custom domains are not included in the current plan for account {0}. Upgrade to enable them")]
    FeatureUnavailable(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_)
            | Self::DomainConflict { .. }
            | Self::TransientLookup(_)
            | Self::AccountNotFound(_)
            | Self::DomainNotConfigured(_)
            | Self::FeatureUnavailable(_) => true,
            Self::StorageError(_) | Self::SerializationError(_) => false,
        }
    }

    /// Whether repeating the same call later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientLookup(_))
    }
}

impl From<DohError> for CoreError {
    fn from(err: DohError) -> Self {
        match err {
            DohError::InvalidName(msg) => Self::ValidationError(msg),
            other => Self::TransientLookup(other.to_string()),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
