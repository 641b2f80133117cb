//! Huginn error types

use serde::{Deserialize, Serialize};

use crate::types::Capability;

/// Huginn error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HuginnError {
    // Registry errors
    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    // Routing errors
    #[error("no registered provider supports capability '{0}'")]
    NoCapableProvider(Capability),

    /// Only reachable when a request pins an explicit provider id.
    #[error("provider '{provider}' does not support capability '{capability}'")]
    CapabilityNotSupported {
        provider: String,
        capability: Capability,
    },

    /// The provider itself reported a failure. Never cached.
    #[error("provider '{provider}' failed: {message}")]
    ProviderCallFailed { provider: String, message: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("request cancelled")]
    Cancelled,
}

/// Coarse classification of [`HuginnError`], carried on failed
/// [`Response`](crate::Response)s so callers can branch without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidProvider,
    ProviderNotFound,
    NoCapableProvider,
    CapabilityNotSupported,
    ProviderCallFailed,
    Configuration,
    Cancelled,
}

impl HuginnError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProvider(_) => ErrorKind::InvalidProvider,
            Self::ProviderNotFound(_) => ErrorKind::ProviderNotFound,
            Self::NoCapableProvider(_) => ErrorKind::NoCapableProvider,
            Self::CapabilityNotSupported { .. } => ErrorKind::CapabilityNotSupported,
            Self::ProviderCallFailed { .. } => ErrorKind::ProviderCallFailed,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Wrap a provider-reported failure.
    pub fn provider_failed(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::ProviderCallFailed {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}

impl From<toml::de::Error> for HuginnError {
    fn from(err: toml::de::Error) -> Self {
        HuginnError::Configuration(err.to_string())
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            HuginnError::ProviderNotFound("x".into()).kind(),
            ErrorKind::ProviderNotFound
        );
        assert_eq!(
            HuginnError::provider_failed("p1", "boom").kind(),
            ErrorKind::ProviderCallFailed
        );
        assert_eq!(HuginnError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NoCapableProvider).unwrap();
        assert_eq!(json, "\"no_capable_provider\"");
    }
}
