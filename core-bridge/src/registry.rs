//! Provider registry.
//!
//! Providers are identified by their concrete Rust type: registering a
//! second instance of a type already present is rejected with a warning.
//! Capabilities are captured once, at registration.

use bridge_traits::{
    Analytics, Attribution, Capabilities, Mediator, ProviderKind, ProviderLifecycle,
};
use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    /// A provider of the same concrete type was already registered.
    Duplicate,
}

impl RegistrationOutcome {
    pub fn is_registered(self) -> bool {
        matches!(self, RegistrationOutcome::Registered)
    }
}

/// A registered provider with its identity and resolved capabilities.
pub struct ProviderHandle<P: ?Sized> {
    provider: Arc<P>,
    lifecycle: Arc<dyn ProviderLifecycle>,
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    kind: ProviderKind,
    capabilities: Capabilities,
}

impl<P: ?Sized> ProviderHandle<P> {
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The same provider viewed through its lifecycle operations.
    pub fn as_lifecycle(&self) -> ProviderHandle<dyn ProviderLifecycle> {
        ProviderHandle {
            provider: Arc::clone(&self.lifecycle),
            lifecycle: Arc::clone(&self.lifecycle),
            name: self.name.clone(),
            type_id: self.type_id,
            type_name: self.type_name,
            kind: self.kind,
            capabilities: self.capabilities,
        }
    }
}

impl<P: ?Sized> Clone for ProviderHandle<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            lifecycle: Arc::clone(&self.lifecycle),
            name: self.name.clone(),
            type_id: self.type_id,
            type_name: self.type_name,
            kind: self.kind,
            capabilities: self.capabilities,
        }
    }
}

impl<P: ?Sized> fmt::Debug for ProviderHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Registered providers, kept in registration order per kind.
#[derive(Default)]
pub struct ProviderRegistry {
    mediators: Vec<ProviderHandle<dyn Mediator>>,
    attributions: Vec<ProviderHandle<dyn Attribution>>,
    analytics: Vec<ProviderHandle<dyn Analytics>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_mediator<M>(&mut self, mediator: Arc<M>) -> RegistrationOutcome
    where
        M: Mediator + 'static,
    {
        let handle = ProviderHandle {
            name: mediator.name().to_string(),
            capabilities: mediator.capabilities(),
            lifecycle: mediator.clone(),
            provider: mediator as Arc<dyn Mediator>,
            type_id: TypeId::of::<M>(),
            type_name: type_name::<M>(),
            kind: ProviderKind::Mediator,
        };
        insert(&mut self.mediators, handle)
    }

    pub fn register_attribution<A>(&mut self, attribution: Arc<A>) -> RegistrationOutcome
    where
        A: Attribution + 'static,
    {
        let handle = ProviderHandle {
            name: attribution.name().to_string(),
            capabilities: attribution.capabilities(),
            lifecycle: attribution.clone(),
            provider: attribution as Arc<dyn Attribution>,
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
            kind: ProviderKind::Attribution,
        };
        insert(&mut self.attributions, handle)
    }

    pub fn register_analytics<A>(&mut self, analytics: Arc<A>) -> RegistrationOutcome
    where
        A: Analytics + 'static,
    {
        let mut capabilities = analytics.capabilities();
        capabilities.custom_dimensions |= analytics.as_custom_dimensions().is_some();

        let handle = ProviderHandle {
            name: analytics.name().to_string(),
            capabilities,
            lifecycle: analytics.clone(),
            provider: analytics as Arc<dyn Analytics>,
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
            kind: ProviderKind::Analytics,
        };
        insert(&mut self.analytics, handle)
    }

    pub fn mediators(&self) -> &[ProviderHandle<dyn Mediator>] {
        &self.mediators
    }

    pub fn attributions(&self) -> &[ProviderHandle<dyn Attribution>] {
        &self.attributions
    }

    pub fn analytics(&self) -> &[ProviderHandle<dyn Analytics>] {
        &self.analytics
    }

    /// Every provider, mediators first, then attributions, then analytics.
    pub fn all(&self) -> Vec<ProviderHandle<dyn ProviderLifecycle>> {
        self.mediators
            .iter()
            .map(ProviderHandle::as_lifecycle)
            .chain(self.attributions.iter().map(ProviderHandle::as_lifecycle))
            .chain(self.analytics.iter().map(ProviderHandle::as_lifecycle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.mediators.len() + self.attributions.len() + self.analytics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.mediators.iter().any(|h| h.type_id == type_id)
            || self.attributions.iter().any(|h| h.type_id == type_id)
            || self.analytics.iter().any(|h| h.type_id == type_id)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("mediators", &self.mediators)
            .field("attributions", &self.attributions)
            .field("analytics", &self.analytics)
            .finish()
    }
}

fn insert<P: ?Sized>(
    handles: &mut Vec<ProviderHandle<P>>,
    handle: ProviderHandle<P>,
) -> RegistrationOutcome {
    if handles.iter().any(|existing| existing.type_id == handle.type_id) {
        warn!(
            provider = handle.name(),
            provider_type = handle.type_name(),
            kind = %handle.kind(),
            "Provider registered twice, ignoring"
        );
        return RegistrationOutcome::Duplicate;
    }

    debug!(
        provider = handle.name(),
        kind = %handle.kind(),
        capabilities = ?handle.capabilities(),
        "Provider registered"
    );
    handles.push(handle);
    RegistrationOutcome::Registered
}
