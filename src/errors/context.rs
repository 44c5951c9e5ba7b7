// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declaration-contract violations raised while a step is running.

use thiserror::Error;

use super::ItemIdError;
use crate::item::ItemId;

#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error(transparent)]
    InvalidItem(#[from] ItemIdError),

    #[error("Step '{step}' did not declare item {item} as produced")]
    UndeclaredProduce { step: String, item: ItemId },

    #[error("Step '{step}' did not declare item {item} as consumed")]
    UndeclaredConsume { step: String, item: ItemId },

    /// A single-valued item was produced a second time in the same run.
    #[error("Cannot provide multiple values for {item} (step '{step}')")]
    CannotMulti { step: String, item: ItemId },

    #[error(
        "Item {item} is {} but was used as {}",
        multiplicity(.is_multi),
        misused_as(.is_multi)
    )]
    WrongMultiplicity { item: ItemId, is_multi: bool },

    #[error("Item {item} does not hold values of type {expected}")]
    TypeMismatch { item: ItemId, expected: &'static str },

    /// A value was supplied for an item the chain does not declare initial.
    #[error("Item {item} was not declared as an initial item")]
    NotInitial { item: ItemId },

    /// Only items declared final can be read from a build result.
    #[error("Item {item} was not declared as a final item")]
    NotFinal { item: ItemId },
}

fn multiplicity(is_multi: &bool) -> &'static str {
    if *is_multi {
        "multi-valued"
    } else {
        "single-valued"
    }
}

fn misused_as(is_multi: &bool) -> &'static str {
    multiplicity(&!*is_multi)
}
