//! Chain assembly
//!
//! Turns a validated slot sequence into the single construction closure the
//! host stores. Construction is a linear pass, re-executed fresh on every
//! instance request: build the root, then fold the wrappers over it in
//! reverse declaration order (the last-declared wrapper is the innermost).

use crate::error::ChainError;
use crate::locator::{erase, AnyArc, ChainProvider, Locator};
use crate::provider::Contract;
use crate::slot::DecoratorSlot;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

pub(crate) fn assemble<S: Contract + ?Sized>(mut slots: Vec<DecoratorSlot<S>>) -> ChainProvider {
    let root = slots.pop();
    let wrappers = slots;

    Arc::new(move |locator: &dyn Locator| -> crate::Result<AnyArc> {
        let root = match &root {
            Some(slot) => slot,
            None => {
                return Err(ChainError::EmptyChain {
                    contract: S::contract_name(),
                })
            }
        };

        #[cfg(feature = "logging")]
        trace!(
            target: "decor",
            contract = S::contract_name(),
            wrappers = wrappers.len(),
            "Constructing decorator chain"
        );

        let mut instance = match root {
            DecoratorSlot::Base { build, .. } => (**build)(locator),
            DecoratorSlot::Factory { build } => (**build)(locator, None),
            // Validation rejects a wrapper in root position before the chain
            // is ever registered.
            DecoratorSlot::Wrapper { name, .. } => {
                return Err(ChainError::RootDependsOnContract {
                    root: *name,
                    contract: S::contract_name(),
                    position: 1,
                })
            }
        }
        .map_err(ChainError::from_fault::<S>)?;

        for slot in wrappers.iter().rev() {
            instance = match slot {
                DecoratorSlot::Wrapper { build, .. } => (**build)(locator, instance),
                DecoratorSlot::Factory { build } => (**build)(locator, Some(instance)),
                DecoratorSlot::Base { name, .. } => {
                    return Err(ChainError::MisplacedImplementation {
                        implementation: *name,
                        contract: S::contract_name(),
                    })
                }
            }
            .map_err(ChainError::from_fault::<S>)?;
        }

        Ok(erase::<S>(instance))
    })
}
