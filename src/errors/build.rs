// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while declaring items and building a chain.

use thiserror::Error;

use crate::builder::StepLocation;
use crate::item::ItemId;

/// An identifier could not be constructed for an item type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemIdError {
    #[error("Item type {item_type} is named and requires a name")]
    MissingName { item_type: &'static str },

    #[error("Item type {item_type} is not named but was given the name '{name}'")]
    UnexpectedName { item_type: &'static str, name: String },
}

/// The chain cannot be constructed from the current declarations.
#[derive(Debug, Clone, Error)]
pub enum ChainBuildError {
    #[error(transparent)]
    InvalidItem(#[from] ItemIdError),

    /// One step declared the same item as both overridable and not.
    #[error("Step {step} declares conflicting produce flags for item {item}")]
    ConflictingDeclaration { item: ItemId, step: StepLocation },

    /// Two steps are real producers of the same single-valued item.
    #[error(
        "Multiple {}producers of item {item}: {existing} conflicts with {conflicting}",
        producer_qualifier(.overridable)
    )]
    ConflictingProducers {
        item: ItemId,
        existing: StepLocation,
        conflicting: StepLocation,
        overridable: bool,
    },

    /// A step produces an item that is supplied as an initial item.
    #[error("Item {item} cannot be produced by {step}: it is an initial item")]
    ProducesInitial { item: ItemId, step: StepLocation },

    /// A required single-valued item has no producer and is not initial.
    #[error("No producers for required item {item}, consumed by {step}")]
    MissingProducer { item: ItemId, step: StepLocation },

    /// The included steps depend on each other in a loop.
    #[error("Cycle detected: {}", .path.join(" -> "))]
    CycleDetected {
        /// Hops of the cycle, each rendered as `"<step> produced <item>"`,
        /// closed by the step the cycle started from.
        path: Vec<String>,
    },

    #[error("Step {step} has no build step attached")]
    UnattachedStep { step: StepLocation },
}

fn producer_qualifier(overridable: &bool) -> &'static str {
    if *overridable {
        "overridable "
    } else {
        ""
    }
}
