// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::flags::{ConsumeFlag, ConsumeFlags, ProduceFlag, ProduceFlags};
use crate::builder::StepIndex;
use crate::item::ItemId;

/// Strength of a produce or consume declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The step actually emits (or reads) the value.
    Real,
    /// The declaration only orders the step relative to other steps.
    OrderOnly,
}

impl Constraint {
    fn strongest(self, other: Constraint) -> Constraint {
        if self == Constraint::Real || other == Constraint::Real {
            Constraint::Real
        } else {
            Constraint::OrderOnly
        }
    }
}

/// A step's declared intent to emit an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Produce {
    step: StepIndex,
    item: ItemId,
    constraint: Constraint,
    flags: ProduceFlags,
}

impl Produce {
    pub(crate) fn new(
        step: StepIndex,
        item: ItemId,
        constraint: Constraint,
        flags: ProduceFlags,
    ) -> Self {
        Self {
            step,
            item,
            constraint,
            flags,
        }
    }

    pub fn step(&self) -> StepIndex {
        self.step
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    pub fn flags(&self) -> ProduceFlags {
        self.flags
    }

    pub fn is_real(&self) -> bool {
        self.constraint == Constraint::Real
    }

    pub fn is_overridable(&self) -> bool {
        self.flags.contains(ProduceFlag::Overridable)
    }

    pub fn is_weak(&self) -> bool {
        self.flags.contains(ProduceFlag::Weak)
    }

    /// Merges a second declaration of the same item on the same step.
    ///
    /// Returns `None` when both declarations are real but disagree on
    /// overridability.
    pub(crate) fn combine(&self, constraint: Constraint, flags: ProduceFlags) -> Option<Produce> {
        let overridable = flags.contains(ProduceFlag::Overridable);
        let merged_flags = match (self.constraint, constraint) {
            (Constraint::Real, Constraint::Real) => {
                if self.is_overridable() != overridable {
                    return None;
                }
                self.flags.intersection(flags)
            }
            (Constraint::Real, Constraint::OrderOnly) => self.flags,
            (Constraint::OrderOnly, Constraint::Real) => flags,
            (Constraint::OrderOnly, Constraint::OrderOnly) => self.flags.intersection(flags),
        };
        Some(Produce {
            step: self.step,
            item: self.item.clone(),
            constraint: self.constraint.strongest(constraint),
            flags: merged_flags,
        })
    }
}

/// A step's declared need for an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Consume {
    step: StepIndex,
    item: ItemId,
    constraint: Constraint,
    flags: ConsumeFlags,
}

impl Consume {
    pub(crate) fn new(
        step: StepIndex,
        item: ItemId,
        constraint: Constraint,
        flags: ConsumeFlags,
    ) -> Self {
        Self {
            step,
            item,
            constraint,
            flags,
        }
    }

    pub fn step(&self) -> StepIndex {
        self.step
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    pub fn flags(&self) -> ConsumeFlags {
        self.flags
    }

    pub fn is_real(&self) -> bool {
        self.constraint == Constraint::Real
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(ConsumeFlag::Optional)
    }

    /// Merges a second declaration; the item stays optional only if both are.
    pub(crate) fn combine(&self, constraint: Constraint, flags: ConsumeFlags) -> Consume {
        Consume {
            step: self.step,
            item: self.item.clone(),
            constraint: self.constraint.strongest(constraint),
            flags: self.flags.intersection(flags),
        }
    }
}
