//! Fluent decorator-chain builder
//!
//! A `DecoratorChain` accumulates slots for one contract in declaration
//! order: the first appended slot becomes the outermost decorator, the last
//! one the base implementation. `register` is the only operation with an
//! externally observable effect.

use crate::assemble::assemble;
use crate::decorator::{Decorator, Implementation};
use crate::error::{BoxError, Result};
use crate::locator::{ChainRegistration, Locator, Registry};
use crate::provider::{Contract, Lifetime, ServiceKey};
use crate::slot::DecoratorSlot;
use crate::validate::validate;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Ordered accumulation of decorator slots for one service contract.
///
/// Consumed exactly once by [`register`](DecoratorChain::register); all other
/// operations are purely local to the builder.
///
/// # Examples
///
/// ```rust
/// use decor::{BoxError, Container, Decorator, DecoratorChain, Implementation, Locator};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Plain;
///
/// impl Greeter for Plain {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// impl Implementation<dyn Greeter> for Plain {
///     fn create(_locator: &dyn Locator) -> Result<Arc<dyn Greeter>, BoxError> {
///         Ok(Arc::new(Plain))
///     }
/// }
///
/// struct Shouting {
///     inner: Arc<dyn Greeter>,
/// }
///
/// impl Greeter for Shouting {
///     fn greet(&self) -> String {
///         self.inner.greet().to_uppercase()
///     }
/// }
///
/// impl Decorator<dyn Greeter> for Shouting {
///     fn decorate(
///         inner: Arc<dyn Greeter>,
///         _locator: &dyn Locator,
///     ) -> Result<Arc<dyn Greeter>, BoxError> {
///         Ok(Arc::new(Shouting { inner }))
///     }
/// }
///
/// let container = Container::new();
///
/// DecoratorChain::<dyn Greeter>::new()
///     .wrap::<Shouting>()
///     .implement::<Plain>()
///     .register(&container)
///     .unwrap();
///
/// let greeter = container.get::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "HELLO");
/// ```
pub struct DecoratorChain<S: Contract + ?Sized> {
    slots: Vec<DecoratorSlot<S>>,
    lifetime: Lifetime,
    key: Option<Cow<'static, str>>,
}

impl<S: Contract + ?Sized> DecoratorChain<S> {
    /// Begin a chain for contract `S`
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            lifetime: Lifetime::default(),
            key: None,
        }
    }

    /// Begin a chain registered under a lookup key.
    ///
    /// Keyed chains coexist with the unkeyed chain and with chains under
    /// other keys for the same contract; resolve them with
    /// [`get_named`](crate::LocatorExt::get_named).
    #[inline]
    pub fn keyed(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            slots: Vec::new(),
            lifetime: Lifetime::default(),
            key: Some(name.into()),
        }
    }

    /// Append a decorator type slot.
    ///
    /// The first `wrap` in a chain becomes the outermost decorator; each
    /// later one sits inside the previous.
    pub fn wrap<D: Decorator<S>>(mut self) -> Self {
        #[cfg(feature = "logging")]
        trace!(
            target: "decor",
            contract = S::contract_name(),
            decorator = std::any::type_name::<D>(),
            position = self.slots.len(),
            "Appending decorator slot"
        );

        self.slots.push(DecoratorSlot::wrapper::<D>());
        self
    }

    /// Append a decorator type slot only when `condition` holds.
    ///
    /// A skipped append leaves the builder untouched; the decorator type is
    /// not consulted at all.
    #[inline]
    pub fn wrap_if<D: Decorator<S>>(self, condition: bool) -> Self {
        if condition {
            self.wrap::<D>()
        } else {
            self
        }
    }

    /// Append a factory slot that wraps the previously built inner instance.
    ///
    /// The factory receives the locator and the accumulated inner. If such a
    /// slot ends up as the final slot of the chain it has no inner to wrap,
    /// and resolving the contract fails with a construction error instead.
    pub fn wrap_fn<F>(mut self, factory: F) -> Self
    where
        F: Fn(&dyn Locator, Arc<S>) -> std::result::Result<Arc<S>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.slots.push(DecoratorSlot::factory(move |locator, inner| {
            let inner = inner.ok_or_else(|| -> BoxError {
                format!(
                    "wrapper factory for {} ended up as the final slot of the chain and has no inner instance to wrap",
                    S::contract_name()
                )
                .into()
            })?;
            factory(locator, inner)
        }));
        self
    }

    /// Append a wrapping factory slot only when `condition` holds.
    #[inline]
    pub fn wrap_fn_if<F>(self, condition: bool, factory: F) -> Self
    where
        F: Fn(&dyn Locator, Arc<S>) -> std::result::Result<Arc<S>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        if condition {
            self.wrap_fn(factory)
        } else {
            self
        }
    }

    /// Append an implementation type slot.
    ///
    /// Valid only as the final slot of the chain; registration fails
    /// otherwise.
    pub fn implement<B: Implementation<S>>(mut self) -> Self {
        #[cfg(feature = "logging")]
        trace!(
            target: "decor",
            contract = S::contract_name(),
            implementation = std::any::type_name::<B>(),
            position = self.slots.len(),
            "Appending implementation slot"
        );

        self.slots.push(DecoratorSlot::base::<B>());
        self
    }

    /// Append a factory slot that builds the base implementation from the
    /// locator alone.
    pub fn implement_fn<F>(mut self, factory: F) -> Self
    where
        F: Fn(&dyn Locator) -> std::result::Result<Arc<S>, BoxError> + Send + Sync + 'static,
    {
        self.slots
            .push(DecoratorSlot::factory(move |locator, _inner| {
                factory(locator)
            }));
        self
    }

    /// Overwrite the declared lifetime; the last write wins.
    ///
    /// Defaults to [`Lifetime::Transient`] when never called.
    #[inline]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Number of slots appended so far
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot has been appended yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validate the chain, assemble the construction closure and hand it to
    /// the host's registration store.
    ///
    /// Replaces any prior registration with the exact same key (an unkeyed
    /// chain replaces the unkeyed entry only; a keyed chain replaces the
    /// same-key entry only). On a validation error nothing is registered and
    /// any prior entry stays in effect.
    pub fn register<R: Registry + ?Sized>(self, registry: &R) -> Result<()> {
        let DecoratorChain {
            slots,
            lifetime,
            key,
        } = self;

        let key = match key {
            Some(name) => ServiceKey::named::<S, _>(name),
            None => ServiceKey::of::<S>(),
        };

        validate::<S>(&slots)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "decor",
            service = %key,
            slots = slots.len(),
            lifetime = ?lifetime,
            "Registering decorator chain"
        );

        let provider = assemble::<S>(slots);
        registry.register(ChainRegistration {
            key,
            lifetime,
            provider,
        });
        Ok(())
    }
}

impl<S: Contract + ?Sized> Default for DecoratorChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Contract + ?Sized> fmt::Debug for DecoratorChain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorChain")
            .field("contract", &S::contract_name())
            .field("slots", &self.slots.len())
            .field("lifetime", &self.lifetime)
            .field("key", &self.key)
            .finish()
    }
}
