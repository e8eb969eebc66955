//! Decorator and implementation traits
//!
//! Without runtime reflection there is no constructor signature to inspect,
//! so each slot type supplies its build function explicitly and declares the
//! extra services it pulls from the locator. The build signatures carry the
//! shape rules ("a decorator takes the contract first", "an implementation
//! takes no inner") at the type level; the declared dependencies feed the
//! runtime self-reference checks.

use crate::error::BoxError;
use crate::locator::Locator;
use crate::provider::Contract;
use std::any::TypeId;
use std::sync::Arc;

/// A constructor-parameter descriptor declared by a slot type.
///
/// `Dependency::on::<T>()` declares a parameter of type `T`.
/// `.with_argument::<A>()` declares that `T` is a parameterized type whose
/// type arguments include `A` — the conservative guard rejects a chain whose
/// decorator mentions its own contract this way, even if the argument is
/// never resolved.
#[derive(Clone, Debug)]
pub struct Dependency {
    type_id: TypeId,
    type_name: &'static str,
    arguments: Vec<(TypeId, &'static str)>,
}

impl Dependency {
    /// Declare a constructor parameter of type `T`
    #[inline]
    pub fn on<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            arguments: Vec::new(),
        }
    }

    /// Declare a type argument of the parameter's type
    #[inline]
    pub fn with_argument<A: ?Sized + 'static>(mut self) -> Self {
        self.arguments
            .push((TypeId::of::<A>(), std::any::type_name::<A>()));
        self
    }

    /// Human-readable name of the parameter type
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The parameter is exactly the given type
    #[inline]
    pub(crate) fn is_exactly(&self, contract: TypeId) -> bool {
        self.type_id == contract
    }

    /// A declared type argument is the given type
    #[inline]
    pub(crate) fn mentions(&self, contract: TypeId) -> bool {
        self.arguments.iter().any(|(id, _)| *id == contract)
    }
}

/// A decorator type slot: wraps a previously built inner implementation.
///
/// `decorate` conventionally returns `Arc::new(Self { inner, .. })`, pulling
/// any further collaborators from the locator. Those collaborators must be
/// declared in [`dependencies`](Decorator::dependencies) so chain validation
/// can reject self-referential configurations.
///
/// # Examples
///
/// ```rust
/// use decor::{BoxError, Decorator, Locator};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
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
/// ```
pub trait Decorator<S: Contract + ?Sized>: Send + Sync + 'static {
    /// Build the decorator around the inner implementation
    fn decorate(inner: Arc<S>, locator: &dyn Locator) -> Result<Arc<S>, BoxError>;

    /// Constructor parameters pulled from the locator, besides the wrapped inner
    #[inline]
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }
}

/// An implementation type slot: the base of a chain, built with no inner.
///
/// # Examples
///
/// ```rust
/// use decor::{BoxError, Implementation, Locator};
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
/// ```
pub trait Implementation<S: Contract + ?Sized>: Send + Sync + 'static {
    /// Build the base implementation, resolving collaborators from the locator
    fn create(locator: &dyn Locator) -> Result<Arc<S>, BoxError>;

    /// Constructor parameters pulled from the locator
    #[inline]
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Pipeline: Send + Sync {}

    struct Stage;

    #[test]
    fn test_dependency_exact_match() {
        let dependency = Dependency::on::<dyn Pipeline>();

        assert!(dependency.is_exactly(TypeId::of::<dyn Pipeline>()));
        assert!(!dependency.is_exactly(TypeId::of::<Stage>()));
        assert!(!dependency.mentions(TypeId::of::<dyn Pipeline>()));
    }

    #[test]
    fn test_dependency_argument_mention() {
        let dependency = Dependency::on::<Vec<Stage>>().with_argument::<dyn Pipeline>();

        assert!(!dependency.is_exactly(TypeId::of::<dyn Pipeline>()));
        assert!(dependency.mentions(TypeId::of::<dyn Pipeline>()));
        assert!(!dependency.mentions(TypeId::of::<Stage>()));
    }
}
