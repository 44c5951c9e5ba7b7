// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Handle;

use super::execution::ExecutionBuilder;
use super::result::ExecutionHandle;
use super::step_info::StepInfo;
use crate::item::ItemId;

/// An immutable, resolved build chain.
///
/// Cloning is cheap and every clone shares the same step graph. A chain can
/// be executed any number of times; each run gets its own isolated state.
#[derive(Clone)]
pub struct Chain {
    inner: Arc<ChainInner>,
}

struct ChainInner {
    steps: Vec<StepInfo>,
    start_steps: Vec<usize>,
    end_step_count: usize,
    consumed: HashSet<ItemId>,
    initial_ids: HashSet<ItemId>,
    final_ids: HashSet<ItemId>,
}

impl Chain {
    pub(crate) fn new(
        steps: Vec<StepInfo>,
        consumed: HashSet<ItemId>,
        initial_ids: HashSet<ItemId>,
        final_ids: HashSet<ItemId>,
    ) -> Self {
        let start_steps = steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.is_start())
            .map(|(position, _)| position)
            .collect();
        let end_step_count = steps.iter().filter(|step| step.is_end()).count();
        Self {
            inner: Arc::new(ChainInner {
                steps,
                start_steps,
                end_step_count,
                consumed,
                initial_ids,
                final_ids,
            }),
        }
    }

    pub fn steps(&self) -> &[StepInfo] {
        &self.inner.steps
    }

    pub fn step_count(&self) -> usize {
        self.inner.steps.len()
    }

    /// Positions of the steps with no dependencies.
    pub fn start_steps(&self) -> &[usize] {
        &self.inner.start_steps
    }

    pub fn start_step_count(&self) -> usize {
        self.inner.start_steps.len()
    }

    /// Number of steps nothing else waits on; a run completes when all of
    /// them have finished.
    pub fn end_step_count(&self) -> usize {
        self.inner.end_step_count
    }

    /// Whether any included step (or the caller, for final items) reads `id`.
    pub fn is_consumed(&self, id: &ItemId) -> bool {
        self.inner.consumed.contains(id)
    }

    pub fn is_initial(&self, id: &ItemId) -> bool {
        self.inner.initial_ids.contains(id)
    }

    pub fn is_final(&self, id: &ItemId) -> bool {
        self.inner.final_ids.contains(id)
    }

    pub fn final_ids(&self) -> &HashSet<ItemId> {
        &self.inner.final_ids
    }

    /// Prepares a run that can be seeded with initial item values.
    pub fn execution_builder(&self, build_target_name: impl Into<String>) -> ExecutionBuilder {
        ExecutionBuilder::new(self.clone(), build_target_name.into())
    }

    /// Starts a run on `handle` with no initial values and the default
    /// failure strategy.
    pub fn execute(&self, build_target_name: impl Into<String>, handle: &Handle) -> ExecutionHandle {
        self.execution_builder(build_target_name).execute(handle)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.inner.steps)
            .field("start_steps", &self.inner.start_steps)
            .field("end_step_count", &self.inner.end_step_count)
            .finish()
    }
}
