//! Response type returned to callers

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, HuginnError};

/// Outcome of a dispatched request.
///
/// Every failure mode of the orchestrator is reported through this type
/// (`success == false`) rather than as a panic or a dropped future.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    /// Payload on success; empty on failure.
    #[serde(default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Provider that produced the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Served from the response cache without a provider call.
    #[serde(default)]
    pub cached: bool,
}

impl Response {
    /// Successful response produced by `provider_id`.
    pub fn ok(text: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            provider_id: Some(provider_id.into()),
            ..Default::default()
        }
    }

    /// Failed response carrying `err`.
    pub fn failure(err: &HuginnError) -> Self {
        let provider_id = match err {
            HuginnError::ProviderCallFailed { provider, .. }
            | HuginnError::CapabilityNotSupported { provider, .. } => Some(provider.clone()),
            _ => None,
        };
        Self {
            success: false,
            text: String::new(),
            error_message: Some(err.to_string()),
            error_kind: Some(err.kind()),
            provider_id,
            cached: false,
        }
    }

    /// Copy of this response marked as a cache hit.
    pub(crate) fn to_cache_hit(&self) -> Self {
        Self {
            cached: true,
            ..self.clone()
        }
    }
}

impl From<crate::Result<Response>> for Response {
    fn from(result: crate::Result<Response>) -> Self {
        match result {
            Ok(response) => response,
            Err(err) => Response::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Capability;

    #[test]
    fn failure_carries_kind_and_message() {
        let err = HuginnError::NoCapableProvider(Capability::Translation);
        let response = Response::failure(&err);
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::NoCapableProvider));
        assert!(response.error_message.unwrap().contains("translation"));
        assert!(response.provider_id.is_none());
    }

    #[test]
    fn provider_failure_names_provider() {
        let response = Response::failure(&HuginnError::provider_failed("p1", "timeout"));
        assert_eq!(response.provider_id.as_deref(), Some("p1"));
    }

    #[test]
    fn cache_hit_copy_is_marked_cached() {
        let response = Response::ok("hello", "p1");
        assert!(!response.cached);
        let hit = response.to_cache_hit();
        assert!(hit.cached);
        assert_eq!(hit.text, "hello");
    }
}
