// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::item::ItemId;
use crate::traits::BuildStep;

/// Frozen view of one included step.
///
/// `dependency_count` is the number of distinct included steps that must
/// finish before this one may start. `dependents` holds the chain positions
/// of the steps waiting on this one. Only real declarations are kept in the
/// produce and consume sets; order-only ones exist purely as edges.
pub struct StepInfo {
    id: String,
    build_step: Arc<dyn BuildStep>,
    dependency_count: usize,
    dependents: Vec<usize>,
    produces: HashSet<ItemId>,
    consumes: HashSet<ItemId>,
}

impl StepInfo {
    pub(crate) fn new(
        id: String,
        build_step: Arc<dyn BuildStep>,
        dependency_count: usize,
        dependents: Vec<usize>,
        produces: HashSet<ItemId>,
        consumes: HashSet<ItemId>,
    ) -> Self {
        Self {
            id,
            build_step,
            dependency_count,
            dependents,
            produces,
            consumes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn build_step(&self) -> &Arc<dyn BuildStep> {
        &self.build_step
    }

    pub fn dependency_count(&self) -> usize {
        self.dependency_count
    }

    pub fn dependents(&self) -> &[usize] {
        &self.dependents
    }

    pub fn is_start(&self) -> bool {
        self.dependency_count == 0
    }

    pub fn is_end(&self) -> bool {
        self.dependents.is_empty()
    }

    pub fn produces_item(&self, id: &ItemId) -> bool {
        self.produces.contains(id)
    }

    pub fn consumes_item(&self, id: &ItemId) -> bool {
        self.consumes.contains(id)
    }

    pub fn produces(&self) -> &HashSet<ItemId> {
        &self.produces
    }

    pub fn consumes(&self) -> &HashSet<ItemId> {
        &self.consumes
    }
}

impl fmt::Debug for StepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepInfo")
            .field("id", &self.id)
            .field("dependency_count", &self.dependency_count)
            .field("dependents", &self.dependents)
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .finish()
    }
}
