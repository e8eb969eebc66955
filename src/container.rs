//! In-memory reference host
//!
//! A minimal container implementing the [`Registry`] and [`Locator`]
//! capabilities the chain core needs from a host: a registration store keyed
//! by contract + optional name, hierarchical scopes, and the three lifetime
//! policies. Useful on its own and as the test host; production integrations
//! can target any other container by implementing the same two traits.

use crate::error::Result;
use crate::locator::{erase, AnyArc, ChainRegistration, Locator, LocatorExt, Registry};
use crate::provider::{Contract, Lifetime, ServiceKey};
use crate::storage::{HostEntry, RegistrationStore};
use crate::ChainError;
use std::borrow::Cow;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Reference host container.
///
/// Stores construction closures and applies their declared lifetimes:
/// transient chains are rebuilt per resolve, singletons are cached once per
/// registration, scoped chains are cached once per scope. Child scopes
/// created with [`scope`](Container::scope) resolve through their ancestors
/// and may override registrations locally.
///
/// # Examples
///
/// ```rust
/// use decor::{BoxError, Container, DecoratorChain, Locator};
/// use std::sync::Arc;
///
/// trait Config: Send + Sync {
///     fn url(&self) -> &str;
/// }
///
/// struct Fixed(String);
///
/// impl Config for Fixed {
///     fn url(&self) -> &str {
///         &self.0
///     }
/// }
///
/// let container = Container::new();
///
/// DecoratorChain::<dyn Config>::new()
///     .implement_fn(|_locator| Ok(Arc::new(Fixed("postgres://localhost".into())) as Arc<dyn Config>))
///     .register(&container)
///     .unwrap();
///
/// let config = container.get::<dyn Config>().unwrap();
/// assert_eq!(config.url(), "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Container {
    storage: Arc<RegistrationStore>,
    depth: u32,
}

impl Container {
    /// Create a new root container
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            depth = 0,
            "Creating new root reference host"
        );

        Self {
            storage: Arc::new(RegistrationStore::new()),
            depth: 0,
        }
    }

    /// Create a child scope that inherits from this container.
    ///
    /// Child scopes resolve registrations from ancestors, may override them
    /// locally, and cache their own instances of `Scoped` chains.
    #[inline]
    pub fn scope(&self) -> Self {
        let child_depth = self.depth + 1;

        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            parent_depth = self.depth,
            child_depth = child_depth,
            parent_services = self.storage.len(),
            "Creating child scope"
        );

        Self {
            storage: Arc::new(RegistrationStore::with_parent(Arc::clone(&self.storage))),
            depth: child_depth,
        }
    }

    /// Register an existing instance as a singleton for contract `S`.
    ///
    /// Convenience for seeding plain collaborators that decorators and
    /// implementations resolve through the locator.
    #[inline]
    pub fn singleton<S: Contract + ?Sized>(&self, instance: Arc<S>) {
        self.insert_instance(ServiceKey::of::<S>(), instance);
    }

    /// Register an existing instance under a lookup key
    #[inline]
    pub fn singleton_named<S: Contract + ?Sized>(
        &self,
        name: impl Into<Cow<'static, str>>,
        instance: Arc<S>,
    ) {
        self.insert_instance(ServiceKey::named::<S, _>(name), instance);
    }

    fn insert_instance<S: Contract + ?Sized>(&self, key: ServiceKey, instance: Arc<S>) {
        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            service = %key,
            lifetime = "singleton",
            depth = self.depth,
            "Registering existing instance"
        );

        let erased = erase::<S>(instance);
        let provider: crate::locator::ChainProvider =
            Arc::new(move |_locator: &dyn Locator| Ok(erased.clone()));
        self.storage
            .insert(key, HostEntry::new(provider, Lifetime::Singleton));
    }

    /// Resolve a service by contract type
    #[inline]
    pub fn get<S: Contract + ?Sized>(&self) -> Result<Arc<S>> {
        LocatorExt::get::<S>(self)
    }

    /// Resolve a named registration
    #[inline]
    pub fn get_named<S: Contract + ?Sized>(&self, name: &str) -> Result<Arc<S>> {
        LocatorExt::get_named::<S, _>(self, name.to_owned())
    }

    /// Try to resolve, returning None if not found
    #[inline]
    pub fn try_get<S: Contract + ?Sized>(&self) -> Option<Arc<S>> {
        LocatorExt::try_get::<S>(self)
    }

    /// Check if a contract is registered in this scope or an ancestor
    #[inline]
    pub fn contains<S: Contract + ?Sized>(&self) -> bool {
        LocatorExt::contains::<S>(self)
    }

    /// Number of registrations in this scope (not including parents)
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if this scope has no registrations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the scope depth (0 = root)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Locator for Container {
    fn get_any(&self, key: &ServiceKey) -> Result<AnyArc> {
        // Snapshot the entry out of the store so the provider can re-enter
        // it for its own dependencies.
        let entry = match self.storage.lookup(key) {
            Some(entry) => entry,
            None => {
                #[cfg(feature = "logging")]
                debug!(
                    target: "decor",
                    service = %key,
                    depth = self.depth,
                    "Service not found in scope chain"
                );
                return Err(ChainError::not_found(key));
            }
        };

        match entry.lifetime {
            Lifetime::Transient => {
                #[cfg(feature = "logging")]
                trace!(
                    target: "decor",
                    service = %key,
                    depth = self.depth,
                    lifetime = "transient",
                    "Building new instance"
                );

                (*entry.provider)(self)
            }
            Lifetime::Singleton => {
                let cell = Arc::clone(&entry.singleton);
                let instance = cell.get_or_try_init(|| {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "decor",
                        service = %key,
                        depth = self.depth,
                        lifetime = "singleton",
                        "Building singleton instance on first access"
                    );

                    (*entry.provider)(self)
                })?;
                Ok(instance.clone())
            }
            Lifetime::Scoped => {
                if let Some(existing) = self.storage.scoped_instance(key) {
                    return Ok(existing);
                }

                #[cfg(feature = "logging")]
                trace!(
                    target: "decor",
                    service = %key,
                    depth = self.depth,
                    lifetime = "scoped",
                    "Building instance for this scope"
                );

                let built = (*entry.provider)(self)?;
                Ok(self.storage.cache_scoped(key.clone(), built))
            }
        }
    }

    fn contains_key(&self, key: &ServiceKey) -> bool {
        self.storage.contains_in_chain(key)
    }
}

impl Registry for Container {
    fn register(&self, registration: ChainRegistration) {
        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            service = %registration.key,
            lifetime = ?registration.lifetime,
            depth = self.depth,
            "Storing decorator-chain registration"
        );

        self.storage.insert(
            registration.key,
            HostEntry::new(registration.provider, registration.lifetime),
        );
    }

    fn deregister(&self, key: &ServiceKey) -> bool {
        let removed = self.storage.remove(key);

        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            service = %key,
            depth = self.depth,
            removed = removed,
            "Removing registration"
        );

        removed
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.len())
            .field("depth", &self.depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::DecoratorChain;
    use crate::error::BoxError;
    use std::result::Result;
    use std::sync::atomic::{AtomicU32, Ordering};

    trait Ticket: Send + Sync {
        fn id(&self) -> u32;
    }

    struct Numbered(u32);

    impl Ticket for Numbered {
        fn id(&self) -> u32 {
            self.0
        }
    }

    fn register_counter(container: &Container, counter: &'static AtomicU32, lifetime: Lifetime) {
        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(move |_locator| -> Result<Arc<dyn Ticket>, BoxError> {
                Ok(Arc::new(Numbered(counter.fetch_add(1, Ordering::SeqCst))))
            })
            .lifetime(lifetime)
            .register(container)
            .unwrap();
    }

    #[test]
    fn test_transient_builds_distinct_instances() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        register_counter(&container, &COUNTER, Lifetime::Transient);

        let first = container.get::<dyn Ticket>().unwrap();
        let second = container.get::<dyn Ticket>().unwrap();

        assert_ne!(first.id(), second.id());
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_singleton_shared_across_scopes() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        register_counter(&container, &COUNTER, Lifetime::Singleton);

        let from_root = container.get::<dyn Ticket>().unwrap();
        let from_scope = container.scope().get::<dyn Ticket>().unwrap();

        assert!(Arc::ptr_eq(&from_root, &from_scope));
    }

    #[test]
    fn test_singleton_built_lazily() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        register_counter(&container, &COUNTER, Lifetime::Singleton);

        assert_eq!(COUNTER.load(Ordering::SeqCst), 0);

        let _ = container.get::<dyn Ticket>().unwrap();
        let _ = container.get::<dyn Ticket>().unwrap();

        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scoped_cached_per_scope() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        register_counter(&container, &COUNTER, Lifetime::Scoped);

        let scope_a = container.scope();
        let scope_b = container.scope();

        let a1 = scope_a.get::<dyn Ticket>().unwrap();
        let a2 = scope_a.get::<dyn Ticket>().unwrap();
        let b = scope_b.get::<dyn Ticket>().unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
    }

    #[test]
    fn test_root_container_is_a_scope() {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let container = Container::new();
        register_counter(&container, &COUNTER, Lifetime::Scoped);

        let first = container.get::<dyn Ticket>().unwrap();
        let second = container.get::<dyn Ticket>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reregistration_replaces_unkeyed_entry() {
        let container = Container::new();

        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(1)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(2)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(container.get::<dyn Ticket>().unwrap().id(), 2);
    }

    #[test]
    fn test_keyed_chains_resolve_independently() {
        let container = Container::new();

        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(1)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        DecoratorChain::<dyn Ticket>::keyed("primary")
            .implement_fn(|_locator| Ok(Arc::new(Numbered(10)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        DecoratorChain::<dyn Ticket>::keyed("fallback")
            .implement_fn(|_locator| Ok(Arc::new(Numbered(20)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        assert_eq!(container.get::<dyn Ticket>().unwrap().id(), 1);
        assert_eq!(container.get_named::<dyn Ticket>("primary").unwrap().id(), 10);
        assert_eq!(container.get_named::<dyn Ticket>("fallback").unwrap().id(), 20);
    }

    #[test]
    fn test_keyed_reregistration_replaces_same_key_only() {
        let container = Container::new();

        DecoratorChain::<dyn Ticket>::keyed("primary")
            .implement_fn(|_locator| Ok(Arc::new(Numbered(10)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        DecoratorChain::<dyn Ticket>::keyed("primary")
            .implement_fn(|_locator| Ok(Arc::new(Numbered(11)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(container.get_named::<dyn Ticket>("primary").unwrap().id(), 11);
    }

    #[test]
    fn test_scope_override_shadows_parent() {
        let container = Container::new();

        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(1)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        let scope = container.scope();
        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(2)) as Arc<dyn Ticket>))
            .register(&scope)
            .unwrap();

        assert_eq!(container.get::<dyn Ticket>().unwrap().id(), 1);
        assert_eq!(scope.get::<dyn Ticket>().unwrap().id(), 2);
    }

    #[test]
    fn test_not_found() {
        let container = Container::new();

        assert!(!container.contains::<dyn Ticket>());
        assert!(container.try_get::<dyn Ticket>().is_none());
        assert!(matches!(
            container.get::<dyn Ticket>(),
            Err(ChainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_deregister_by_exact_key() {
        let container = Container::new();

        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| Ok(Arc::new(Numbered(1)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();
        DecoratorChain::<dyn Ticket>::keyed("primary")
            .implement_fn(|_locator| Ok(Arc::new(Numbered(10)) as Arc<dyn Ticket>))
            .register(&container)
            .unwrap();

        assert!(container.deregister(&ServiceKey::of::<dyn Ticket>()));

        assert!(container.get::<dyn Ticket>().is_err());
        assert_eq!(container.get_named::<dyn Ticket>("primary").unwrap().id(), 10);
    }

    #[test]
    fn test_construction_errors_are_not_cached() {
        use std::sync::atomic::AtomicBool;
        static HEALTHY: AtomicBool = AtomicBool::new(false);

        let container = Container::new();
        DecoratorChain::<dyn Ticket>::new()
            .implement_fn(|_locator| -> Result<Arc<dyn Ticket>, BoxError> {
                if HEALTHY.load(Ordering::SeqCst) {
                    Ok(Arc::new(Numbered(1)))
                } else {
                    Err("warming up".into())
                }
            })
            .lifetime(Lifetime::Singleton)
            .register(&container)
            .unwrap();

        assert!(container.get::<dyn Ticket>().is_err());

        HEALTHY.store(true, Ordering::SeqCst);
        assert_eq!(container.get::<dyn Ticket>().unwrap().id(), 1);
    }

    #[test]
    fn test_seeded_named_instance() {
        let container = Container::new();
        container.singleton_named("spare", Arc::new(Numbered(7)) as Arc<dyn Ticket>);

        assert!(container.get::<dyn Ticket>().is_err());
        assert_eq!(container.get_named::<dyn Ticket>("spare").unwrap().id(), 7);
    }

    #[test]
    fn test_seeded_singleton_instance() {
        let container = Container::new();
        container.singleton::<dyn Ticket>(Arc::new(Numbered(99)));

        let first = container.get::<dyn Ticket>().unwrap();
        let second = container.get::<dyn Ticket>().unwrap();

        assert_eq!(first.id(), 99);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
