//! Error types for decorator-chain configuration and construction

use crate::provider::ServiceKey;
use thiserror::Error;

/// Type-erased fault produced by decorator and factory implementations.
///
/// Anything surfacing from user code that is not already a [`ChainError`]
/// gets rewrapped into [`ChainError::Construction`] during chain assembly.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while configuring or constructing a decorator chain
#[derive(Error, Debug)]
pub enum ChainError {
    /// Chain was finalized without any slots
    #[error("no decorators or implementation registered for {contract}")]
    EmptyChain { contract: &'static str },

    /// The same concrete decorator type appears more than once in one chain
    #[error("decorator type(s) appear more than once in the chain for {contract}: {}", .duplicates.join(", "))]
    DuplicateDecorator {
        contract: &'static str,
        duplicates: Vec<&'static str>,
    },

    /// An implementation slot was appended before the end of the chain
    #[error("{implementation} does not wrap an inner {contract} and can only occupy the final slot of the chain")]
    MisplacedImplementation {
        implementation: &'static str,
        contract: &'static str,
    },

    /// A decorator declares a dependency that is, or generically contains, its own contract
    #[error("{decorator} declares a dependency on {dependency}, which is or contains the decorated contract {contract}")]
    SelfReference {
        decorator: &'static str,
        contract: &'static str,
        dependency: &'static str,
    },

    /// The final slot of the chain depends on the contract it is supposed to implement
    #[error("{root} is the final slot of the chain for {contract} but takes the contract at constructor position {position}")]
    RootDependsOnContract {
        root: &'static str,
        contract: &'static str,
        position: usize,
    },

    /// Building the chain failed at instance-construction time
    #[error("failed to construct the decorator chain for {contract}")]
    Construction {
        contract: &'static str,
        #[source]
        source: BoxError,
    },

    /// Service was not found in the registration store
    #[error("service not found: {key}")]
    NotFound { key: ServiceKey },

    /// Internal error
    #[error("internal decor error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Create a NotFound error for a key
    #[inline]
    pub fn not_found(key: &ServiceKey) -> Self {
        Self::NotFound { key: key.clone() }
    }

    /// Create a Construction error for a contract
    #[inline]
    pub fn construction<S: ?Sized + 'static>(source: BoxError) -> Self {
        Self::Construction {
            contract: std::any::type_name::<S>(),
            source,
        }
    }

    /// Create an Internal error
    #[inline]
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap a construction fault, letting the library's own error kinds pass through
    pub(crate) fn from_fault<S: ?Sized + 'static>(fault: BoxError) -> Self {
        match fault.downcast::<ChainError>() {
            Ok(own) => *own,
            Err(source) => Self::construction::<S>(source),
        }
    }
}

/// Result type alias for chain operations
pub type Result<T> = std::result::Result<T, ChainError>;
