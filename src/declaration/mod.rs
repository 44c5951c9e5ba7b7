// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Produce and consume declarations attached to step builders.

mod flags;
mod produce;

pub use flags::{ConsumeFlag, ConsumeFlags, Flag, Flags, ProduceFlag, ProduceFlags};
pub use produce::{Constraint, Consume, Produce};
