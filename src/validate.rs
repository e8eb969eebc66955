//! Chain validation
//!
//! Runs once per chain, at registration, over the full slot sequence:
//! duplicate-type scan first, then shape and self-reference checks per
//! non-root slot, then the root shape check. The first failure aborts and the
//! chain is never handed to the host.

use crate::error::{ChainError, Result};
use crate::provider::Contract;
use crate::slot::DecoratorSlot;
use std::any::TypeId;

#[cfg(feature = "logging")]
use tracing::warn;

pub(crate) fn validate<S: Contract + ?Sized>(slots: &[DecoratorSlot<S>]) -> Result<()> {
    let contract = S::contract_name();
    let contract_id = S::contract_id();

    let (root, wrappers) = match slots.split_last() {
        Some(split) => split,
        None => return Err(ChainError::EmptyChain { contract }),
    };

    check_duplicates(slots, contract)?;

    for slot in wrappers {
        match slot {
            DecoratorSlot::Base { name, .. } => {
                return Err(ChainError::MisplacedImplementation {
                    implementation: *name,
                    contract,
                });
            }
            DecoratorSlot::Wrapper {
                name, dependencies, ..
            } => {
                for dependency in dependencies {
                    if dependency.is_exactly(contract_id) {
                        return Err(ChainError::SelfReference {
                            decorator: *name,
                            contract,
                            dependency: dependency.type_name(),
                        });
                    }
                    if dependency.mentions(contract_id) {
                        #[cfg(feature = "logging")]
                        warn!(
                            target: "decor",
                            decorator = name,
                            contract = contract,
                            dependency = dependency.type_name(),
                            "Dependency generically mentions the decorated contract; rejecting chain"
                        );
                        return Err(ChainError::SelfReference {
                            decorator: *name,
                            contract,
                            dependency: dependency.type_name(),
                        });
                    }
                }
            }
            // Factories are never inspected: two factories may legitimately
            // produce different instances even if visually similar.
            DecoratorSlot::Factory { .. } => {}
        }
    }

    match root {
        // A wrapper's inner is its first constructor parameter.
        DecoratorSlot::Wrapper { name, .. } => Err(ChainError::RootDependsOnContract {
            root: *name,
            contract,
            position: 1,
        }),
        DecoratorSlot::Base {
            name, dependencies, ..
        } => {
            for (index, dependency) in dependencies.iter().enumerate() {
                if dependency.is_exactly(contract_id) {
                    return Err(ChainError::RootDependsOnContract {
                        root: *name,
                        contract,
                        position: index + 1,
                    });
                }
            }
            Ok(())
        }
        DecoratorSlot::Factory { .. } => Ok(()),
    }
}

fn check_duplicates<S: Contract + ?Sized>(
    slots: &[DecoratorSlot<S>],
    contract: &'static str,
) -> Result<()> {
    let mut seen: Vec<(TypeId, &'static str, usize)> = Vec::new();
    for slot in slots {
        if let Some((id, name)) = slot.type_info() {
            match seen.iter_mut().find(|(seen_id, _, _)| *seen_id == id) {
                Some((_, _, count)) => *count += 1,
                None => seen.push((id, name, 1)),
            }
        }
    }

    let duplicates: Vec<&'static str> = seen
        .iter()
        .filter(|(_, _, count)| *count > 1)
        .map(|(_, name, _)| *name)
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ChainError::DuplicateDecorator {
            contract,
            duplicates,
        })
    }
}
