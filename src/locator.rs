//! Host container abstraction
//!
//! The chain core never talks to a concrete container. It produces a
//! construction closure and hands it to a [`Registry`]; at resolution time the
//! host calls the closure back with a [`Locator`] for dependency lookup. The
//! in-memory [`Container`](crate::Container) implements both traits, and any
//! other host can by implementing them itself.

use crate::error::{ChainError, Result};
use crate::provider::{Contract, Lifetime, ServiceKey};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Type-erased service instance as stored by a host.
///
/// The payload inside the `dyn Any` is always the sized `Arc<S>` handle, not
/// `S` itself, so contracts that are trait objects can cross the erasure
/// boundary.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// The construction closure produced by chain assembly.
///
/// Invoked by the host once per requested instance, per the declared
/// lifetime. Holds no mutable state; safe to call concurrently.
pub type ChainProvider = Arc<dyn Fn(&dyn Locator) -> Result<AnyArc> + Send + Sync>;

/// A finalized chain, ready for insertion into a host's registration store.
pub struct ChainRegistration {
    /// Contract type plus optional lookup key
    pub key: ServiceKey,
    /// Declared caching granularity
    pub lifetime: Lifetime,
    /// Lazy construction closure
    pub provider: ChainProvider,
}

impl fmt::Debug for ChainRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainRegistration")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Service lookup capability a host exposes to construction closures.
pub trait Locator: Send + Sync {
    /// Resolve a type-erased instance for the given key
    fn get_any(&self, key: &ServiceKey) -> Result<AnyArc>;

    /// Check whether the key is registered (in this scope or an ancestor)
    fn contains_key(&self, key: &ServiceKey) -> bool;
}

/// Typed convenience methods over any [`Locator`].
pub trait LocatorExt: Locator {
    /// Resolve a service by contract type
    #[inline]
    fn get<S: Contract + ?Sized>(&self) -> Result<Arc<S>> {
        unerase::<S>(self.get_any(&ServiceKey::of::<S>())?)
    }

    /// Resolve a named registration by contract type and key
    #[inline]
    fn get_named<S, N>(&self, name: N) -> Result<Arc<S>>
    where
        S: Contract + ?Sized,
        N: Into<Cow<'static, str>>,
    {
        unerase::<S>(self.get_any(&ServiceKey::named::<S, _>(name))?)
    }

    /// Try to resolve, returning None if not found
    #[inline]
    fn try_get<S: Contract + ?Sized>(&self) -> Option<Arc<S>> {
        self.get::<S>().ok()
    }

    /// Check if a contract is registered without a key
    #[inline]
    fn contains<S: Contract + ?Sized>(&self) -> bool {
        self.contains_key(&ServiceKey::of::<S>())
    }
}

impl<L: Locator + ?Sized> LocatorExt for L {}

/// Registration store capability a host exposes to `DecoratorChain::register`.
pub trait Registry: Send + Sync {
    /// Insert a registration, replacing any prior entry with the exact same key
    fn register(&self, registration: ChainRegistration);

    /// Remove a registration by exact key match; returns whether one existed
    fn deregister(&self, key: &ServiceKey) -> bool;
}

/// Erase a typed handle for storage in a host.
#[inline]
pub(crate) fn erase<S: Contract + ?Sized>(instance: Arc<S>) -> AnyArc {
    Arc::new(instance)
}

/// Recover the typed handle from an erased one.
///
/// Hosts key entries by `ServiceKey::of::<S>()`, so a mismatch here means the
/// store handed back a value registered under a foreign key.
#[inline]
pub(crate) fn unerase<S: Contract + ?Sized>(erased: AnyArc) -> Result<Arc<S>> {
    match erased.downcast::<Arc<S>>() {
        Ok(handle) => Ok((*handle).clone()),
        Err(_) => Err(ChainError::internal(format!(
            "registration store returned a value of unexpected type for {}",
            std::any::type_name::<S>()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Port: Send + Sync {
        fn number(&self) -> u16;
    }

    struct Fixed(u16);

    impl Port for Fixed {
        fn number(&self) -> u16 {
            self.0
        }
    }

    #[test]
    fn test_erase_round_trip_for_trait_object() {
        let port: Arc<dyn Port> = Arc::new(Fixed(8080));
        let erased = erase::<dyn Port>(port);

        let recovered = unerase::<dyn Port>(erased).unwrap();
        assert_eq!(recovered.number(), 8080);
    }

    #[test]
    fn test_unerase_rejects_foreign_payload() {
        let erased: AnyArc = Arc::new(String::from("not a handle"));
        let result = unerase::<dyn Port>(erased);

        assert!(matches!(result, Err(ChainError::Internal(_))));
    }
}
