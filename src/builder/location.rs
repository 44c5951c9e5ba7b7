// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::panic::Location;

/// Position of a step in the chain builder's registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepIndex(pub(crate) usize);

impl StepIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Identity and registration site of a step, used in build errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLocation {
    pub step_id: String,
    pub file: &'static str,
    pub line: u32,
}

impl StepLocation {
    pub(crate) fn new(step_id: String, registered_at: &'static Location<'static>) -> Self {
        Self {
            step_id,
            file: registered_at.file(),
            line: registered_at.line(),
        }
    }
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (registered at {}:{})", self.step_id, self.file, self.line)
    }
}
