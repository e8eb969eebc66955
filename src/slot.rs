//! Chain slot representation
//!
//! One slot per link in a chain. Type-based slots carry their `TypeId`, name
//! and declared dependencies for validation; factory slots are opaque and
//! never inspected.

use crate::decorator::{Decorator, Dependency, Implementation};
use crate::error::BoxError;
use crate::locator::Locator;
use crate::provider::Contract;
use std::any::TypeId;
use std::sync::Arc;

pub(crate) type WrapFn<S> =
    Arc<dyn Fn(&dyn Locator, Arc<S>) -> Result<Arc<S>, BoxError> + Send + Sync>;

pub(crate) type RootFn<S> = Arc<dyn Fn(&dyn Locator) -> Result<Arc<S>, BoxError> + Send + Sync>;

pub(crate) type FactoryFn<S> =
    Arc<dyn Fn(&dyn Locator, Option<Arc<S>>) -> Result<Arc<S>, BoxError> + Send + Sync>;

/// One entry in a decorator chain.
///
/// Immutable once appended; consumed by assembly when the chain is finalized.
pub(crate) enum DecoratorSlot<S: Contract + ?Sized> {
    /// Type-based wrapper: built from an inner instance plus the locator
    Wrapper {
        id: TypeId,
        name: &'static str,
        dependencies: Vec<Dependency>,
        build: WrapFn<S>,
    },
    /// Type-based base implementation: built from the locator alone
    Base {
        id: TypeId,
        name: &'static str,
        dependencies: Vec<Dependency>,
        build: RootFn<S>,
    },
    /// Caller-supplied closure; the inner is absent when the slot is the root
    Factory { build: FactoryFn<S> },
}

impl<S: Contract + ?Sized> DecoratorSlot<S> {
    /// Slot for a decorator type
    pub fn wrapper<D: Decorator<S>>() -> Self {
        Self::Wrapper {
            id: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
            dependencies: D::dependencies(),
            build: Arc::new(|locator, inner| D::decorate(inner, locator)),
        }
    }

    /// Slot for an implementation type
    pub fn base<B: Implementation<S>>() -> Self {
        Self::Base {
            id: TypeId::of::<B>(),
            name: std::any::type_name::<B>(),
            dependencies: B::dependencies(),
            build: Arc::new(|locator| B::create(locator)),
        }
    }

    /// Slot for a factory closure
    pub fn factory<F>(build: F) -> Self
    where
        F: Fn(&dyn Locator, Option<Arc<S>>) -> Result<Arc<S>, BoxError> + Send + Sync + 'static,
    {
        Self::Factory {
            build: Arc::new(build),
        }
    }

    /// Type identity of a type-based slot; None for factories
    pub fn type_info(&self) -> Option<(TypeId, &'static str)> {
        match self {
            Self::Wrapper { id, name, .. } | Self::Base { id, name, .. } => Some((*id, *name)),
            Self::Factory { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChainError, Result as ChainResult};
    use crate::locator::AnyArc;
    use crate::provider::ServiceKey;

    trait Speak: Send + Sync {
        fn say(&self) -> String;
    }

    struct Silent;

    impl Speak for Silent {
        fn say(&self) -> String {
            String::new()
        }
    }

    impl Implementation<dyn Speak> for Silent {
        fn create(_locator: &dyn Locator) -> Result<Arc<dyn Speak>, BoxError> {
            Ok(Arc::new(Silent))
        }
    }

    struct Echo {
        inner: Arc<dyn Speak>,
    }

    impl Speak for Echo {
        fn say(&self) -> String {
            format!("{0}{0}", self.inner.say())
        }
    }

    impl Decorator<dyn Speak> for Echo {
        fn decorate(inner: Arc<dyn Speak>, _locator: &dyn Locator) -> Result<Arc<dyn Speak>, BoxError> {
            Ok(Arc::new(Echo { inner }))
        }
    }

    struct NoHost;

    impl Locator for NoHost {
        fn get_any(&self, key: &ServiceKey) -> ChainResult<AnyArc> {
            Err(ChainError::not_found(key))
        }

        fn contains_key(&self, _key: &ServiceKey) -> bool {
            false
        }
    }

    #[test]
    fn test_type_slots_carry_identity() {
        let wrapper = DecoratorSlot::<dyn Speak>::wrapper::<Echo>();
        let base = DecoratorSlot::<dyn Speak>::base::<Silent>();

        let (wrapper_id, wrapper_name) = wrapper.type_info().unwrap();
        assert_eq!(wrapper_id, TypeId::of::<Echo>());
        assert!(wrapper_name.contains("Echo"));

        let (base_id, _) = base.type_info().unwrap();
        assert_eq!(base_id, TypeId::of::<Silent>());
    }

    #[test]
    fn test_factory_slot_has_no_identity() {
        let slot = DecoratorSlot::<dyn Speak>::factory(|_locator, _inner| {
            Ok(Arc::new(Silent) as Arc<dyn Speak>)
        });

        assert!(slot.type_info().is_none());
    }

    #[test]
    fn test_wrapper_slot_builds_through_trait() {
        let slot = DecoratorSlot::<dyn Speak>::wrapper::<Echo>();
        let inner: Arc<dyn Speak> = Arc::new(Silent);

        match slot {
            DecoratorSlot::Wrapper { build, .. } => {
                let wrapped = (*build)(&NoHost, inner).unwrap();
                assert_eq!(wrapped.say(), "");
            }
            _ => panic!("expected a wrapper slot"),
        }
    }
}
