//! The provider trait consumed by the registry and orchestrator.
//!
//! A provider is an opaque backend adapter (a vendor HTTP client, a local
//! model runner, a test double) that declares which [`Capability`] tags it
//! can serve and processes requests asynchronously. Huginn never looks
//! inside a provider; it only routes to it.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use huginn::{Capability, Provider, Request, Result};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Provider for Echo {
//!     fn id(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn capabilities(&self) -> &[Capability] {
//!         &[Capability::TextGeneration]
//!     }
//!
//!     async fn process(&self, request: &Request) -> Result<String> {
//!         Ok(request.input_text.clone())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{Capability, Request};

/// Backend that can serve one or more capabilities.
///
/// `id()` must be non-empty and stable for the lifetime of the process;
/// the registry keys on it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique, stable identifier.
    fn id(&self) -> &str;

    /// Human-readable display name. Defaults to the id.
    fn name(&self) -> &str {
        self.id()
    }

    /// Capability tags this provider can serve.
    fn capabilities(&self) -> &[Capability];

    /// Whether the provider can stream. Informational only.
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Whether the provider declares `capability`.
    fn supports(&self, capability: &Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Process a request, returning the response text.
    ///
    /// Any error returned here is reported to the caller as
    /// `ProviderCallFailed` and is never cached.
    async fn process(&self, request: &Request) -> Result<String>;
}
