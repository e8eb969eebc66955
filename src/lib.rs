//! # Decor - Fluent Decorator Chains for Dependency Injection
//!
//! A small, type-safe helper for registering chains of decorators with a
//! dependency-injection host. Declare the chain once, outermost first; the
//! host builds the nested object graph lazily, on resolution, per the
//! declared lifetime.
//!
//! ## Features
//!
//! - 🪆 **Decorator chains** - Register `[LogWrap, RetryWrap, BaseImpl]` and resolve `Log(Retry(Base))`
//! - 🔒 **Type-safe** - Contract-first construction is enforced by trait signatures, not reflection
//! - 🛡️ **Validated** - Duplicate decorators and self-referential configurations are rejected at registration
//! - 🏭 **Lazy** - Chains are assembled into a single construction closure, invoked per instance request
//! - ♻️ **Lifetimes** - Transient, scoped and singleton caching applied by the host
//! - 🔌 **Host-agnostic** - Any container implementing [`Registry`] + [`Locator`] works; an in-memory reference host ships in the crate
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use decor::{BoxError, Container, Decorator, DecoratorChain, Implementation, Locator};
//! use std::sync::Arc;
//!
//! trait Command: Send + Sync {
//!     fn execute(&self) -> String;
//! }
//!
//! struct BaseImpl;
//!
//! impl Command for BaseImpl {
//!     fn execute(&self) -> String {
//!         "Base".into()
//!     }
//! }
//!
//! impl Implementation<dyn Command> for BaseImpl {
//!     fn create(_locator: &dyn Locator) -> Result<Arc<dyn Command>, BoxError> {
//!         Ok(Arc::new(BaseImpl))
//!     }
//! }
//!
//! struct RetryWrap {
//!     inner: Arc<dyn Command>,
//! }
//!
//! impl Command for RetryWrap {
//!     fn execute(&self) -> String {
//!         format!("Retry({})", self.inner.execute())
//!     }
//! }
//!
//! impl Decorator<dyn Command> for RetryWrap {
//!     fn decorate(
//!         inner: Arc<dyn Command>,
//!         _locator: &dyn Locator,
//!     ) -> Result<Arc<dyn Command>, BoxError> {
//!         Ok(Arc::new(RetryWrap { inner }))
//!     }
//! }
//!
//! struct LogWrap {
//!     inner: Arc<dyn Command>,
//! }
//!
//! impl Command for LogWrap {
//!     fn execute(&self) -> String {
//!         format!("Log({})", self.inner.execute())
//!     }
//! }
//!
//! impl Decorator<dyn Command> for LogWrap {
//!     fn decorate(
//!         inner: Arc<dyn Command>,
//!         _locator: &dyn Locator,
//!     ) -> Result<Arc<dyn Command>, BoxError> {
//!         Ok(Arc::new(LogWrap { inner }))
//!     }
//! }
//!
//! let container = Container::new();
//!
//! // First slot is outermost, last slot is the base implementation
//! DecoratorChain::<dyn Command>::new()
//!     .wrap::<LogWrap>()
//!     .wrap::<RetryWrap>()
//!     .implement::<BaseImpl>()
//!     .register(&container)
//!     .unwrap();
//!
//! let command = container.get::<dyn Command>().unwrap();
//! assert_eq!(command.execute(), "Log(Retry(Base))");
//! ```
//!
//! ## Lifetimes
//!
//! Chains default to [`Lifetime::Transient`] - a fresh instance per resolve.
//! Declare [`Lifetime::Singleton`] or [`Lifetime::Scoped`] to let the host
//! cache the constructed chain:
//!
//! ```rust
//! use decor::{Container, DecoratorChain, Lifetime};
//! use std::sync::Arc;
//!
//! trait Session: Send + Sync {}
//! struct Live;
//! impl Session for Live {}
//!
//! let container = Container::new();
//!
//! DecoratorChain::<dyn Session>::new()
//!     .implement_fn(|_locator| Ok(Arc::new(Live) as Arc<dyn Session>))
//!     .lifetime(Lifetime::Scoped)
//!     .register(&container)
//!     .unwrap();
//!
//! let request_scope = container.scope();
//! let first = request_scope.get::<dyn Session>().unwrap();
//! let second = request_scope.get::<dyn Session>().unwrap();
//!
//! // Same instance within one scope, fresh instance in the next
//! assert!(Arc::ptr_eq(&first, &second));
//! ```
//!
//! ## Keyed chains
//!
//! Several chains can coexist for one contract under different lookup keys:
//!
//! ```rust
//! use decor::{Container, DecoratorChain};
//! use std::sync::Arc;
//!
//! trait Store: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//! struct Named(&'static str);
//! impl Store for Named {
//!     fn name(&self) -> &'static str {
//!         self.0
//!     }
//! }
//!
//! let container = Container::new();
//!
//! DecoratorChain::<dyn Store>::keyed("primary")
//!     .implement_fn(|_locator| Ok(Arc::new(Named("primary")) as Arc<dyn Store>))
//!     .register(&container)
//!     .unwrap();
//!
//! DecoratorChain::<dyn Store>::keyed("replica")
//!     .implement_fn(|_locator| Ok(Arc::new(Named("replica")) as Arc<dyn Store>))
//!     .register(&container)
//!     .unwrap();
//!
//! assert_eq!(container.get_named::<dyn Store>("primary").unwrap().name(), "primary");
//! assert_eq!(container.get_named::<dyn Store>("replica").unwrap().name(), "replica");
//! ```

mod assemble;
mod chain;
mod container;
mod decorator;
mod error;
mod locator;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod slot;
mod storage;
mod validate;

pub use chain::*;
pub use container::*;
pub use decorator::*;
pub use error::*;
pub use locator::*;
pub use provider::*;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BoxError, ChainError, ChainRegistration, Container, Contract, Decorator, DecoratorChain,
        Dependency, Implementation, Lifetime, Locator, LocatorExt, Registry, Result, ServiceKey,
    };
    pub use std::sync::Arc;
}
