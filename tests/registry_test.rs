//! Tests for [`ProviderRegistry`].

use std::sync::Arc;

use async_trait::async_trait;
use huginn::{Capability, HuginnError, Provider, ProviderRegistry, Request, Result};

struct Named {
    id: &'static str,
    name: &'static str,
}

#[async_trait]
impl Provider for Named {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::TextGeneration]
    }

    async fn process(&self, _request: &Request) -> Result<String> {
        Ok(self.name.to_string())
    }
}

fn provider(id: &'static str, name: &'static str) -> Arc<dyn Provider> {
    Arc::new(Named { id, name })
}

#[test]
fn empty_registry() {
    let registry = ProviderRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.active_id().is_none());
    assert!(registry.active_provider().is_none());
    assert!(registry.get("anything").is_none());
}

#[test]
fn listing_follows_registration_order() {
    let mut registry = ProviderRegistry::new();
    registry.register(provider("zeta", "Zeta Cloud")).unwrap();
    registry.register(provider("alpha", "Alpha Local")).unwrap();
    registry.register(provider("mid", "Mid Tier")).unwrap();

    assert_eq!(registry.all_ids(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(
        registry.all_names(),
        vec!["Zeta Cloud", "Alpha Local", "Mid Tier"]
    );
    assert_eq!(registry.active_id(), Some("zeta"));
}

#[test]
fn reregistering_keeps_position_and_active() {
    let mut registry = ProviderRegistry::new();
    registry.register(provider("a", "A v1")).unwrap();
    registry.register(provider("b", "B")).unwrap();
    registry.register(provider("a", "A v2")).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.all_names(), vec!["A v2", "B"]);
    assert_eq!(registry.active_id(), Some("a"));
}

#[test]
fn blank_ids_are_rejected() {
    let mut registry = ProviderRegistry::new();
    for id in ["", "   "] {
        let result = registry.register(provider(id, "blank"));
        assert!(matches!(result, Err(HuginnError::InvalidProvider(_))));
    }
    assert!(registry.is_empty());
}

#[test]
fn set_active_switches_and_rejects_unknown() {
    let mut registry = ProviderRegistry::new();
    registry.register(provider("a", "A")).unwrap();
    registry.register(provider("b", "B")).unwrap();

    registry.set_active("b").unwrap();
    assert_eq!(registry.active_provider().unwrap().id(), "b");

    let err = registry.set_active("c").unwrap_err();
    assert_eq!(err, HuginnError::ProviderNotFound("c".to_string()));
    assert_eq!(registry.active_id(), Some("b"));
}

#[test]
fn unregister_inactive_leaves_active_alone() {
    let mut registry = ProviderRegistry::new();
    registry.register(provider("a", "A")).unwrap();
    registry.register(provider("b", "B")).unwrap();

    let removed = registry.unregister("b").unwrap();
    assert_eq!(removed.id(), "b");
    assert_eq!(registry.active_id(), Some("a"));
    assert!(!registry.contains("b"));
}

#[test]
fn unregister_last_clears_active() {
    let mut registry = ProviderRegistry::new();
    registry.register(provider("only", "Only")).unwrap();
    registry.unregister("only").unwrap();

    assert!(registry.is_empty());
    assert!(registry.active_id().is_none());
    assert!(matches!(
        registry.unregister("only"),
        Err(HuginnError::ProviderNotFound(_))
    ));
}
