//! Contract, lifetime and key primitives
//!
//! These types define what can be decorated and how registrations are
//! addressed in a host container.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for service contracts that can be decorated.
///
/// This is automatically implemented for every type that is
/// `Send + Sync + 'static`, including unsized trait objects, so a chain can
/// decorate `dyn MyService` directly. You never need to implement this
/// manually.
pub trait Contract: Send + Sync + 'static {
    /// Returns the TypeId of this contract (for internal use)
    #[inline]
    fn contract_id() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Returns the contract name for diagnostics
    #[inline]
    fn contract_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is a contract
impl<T: ?Sized + Send + Sync + 'static> Contract for T {}

/// Caching granularity for constructed chain instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// New instance built on every resolve
    #[default]
    Transient,

    /// One instance per scope
    Scoped,

    /// Single instance shared for the container lifetime
    Singleton,
}

/// Address of a registration: the contract type plus an optional lookup key.
///
/// Two chains registered for the same contract coexist when their keys
/// differ; registering under an existing key replaces that entry only.
#[derive(Debug, Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Cow<'static, str>>,
}

impl ServiceKey {
    /// Key for an unnamed registration of contract `S`
    #[inline]
    pub fn of<S: Contract + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            name: None,
        }
    }

    /// Key for a named registration of contract `S`
    #[inline]
    pub fn named<S, N>(name: N) -> Self
    where
        S: Contract + ?Sized,
        N: Into<Cow<'static, str>>,
    {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            name: Some(name.into()),
        }
    }

    /// TypeId of the contract
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable contract name
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Optional lookup key
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (key \"{}\")", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Sample: Send + Sync {}

    #[test]
    fn test_keyed_and_unkeyed_differ() {
        let plain = ServiceKey::of::<dyn Sample>();
        let named = ServiceKey::named::<dyn Sample, _>("replica");

        assert_ne!(plain, named);
        assert_eq!(plain.type_id(), named.type_id());
    }

    #[test]
    fn test_same_name_same_key() {
        let a = ServiceKey::named::<dyn Sample, _>("replica");
        let b = ServiceKey::named::<dyn Sample, _>(String::from("replica"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_display() {
        let named = ServiceKey::named::<dyn Sample, _>("replica");
        let rendered = format!("{named}");

        assert!(rendered.contains("Sample"));
        assert!(rendered.contains("replica"));
    }

    #[test]
    fn test_default_lifetime_is_transient() {
        assert_eq!(Lifetime::default(), Lifetime::Transient);
    }
}
