// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use super::diagnostic::Diagnostic;
use super::values::{downcast, downcast_all};
use crate::errors::{ContextError, ExecutionError};
use crate::item::{BuildItem, ItemId, ItemValue};

/// Outcome of one run: success flag, diagnostics and the final items.
pub struct BuildResult {
    build_target_name: String,
    success: bool,
    diagnostics: Vec<Diagnostic>,
    duration: Duration,
    final_ids: HashSet<ItemId>,
    singles: HashMap<ItemId, ItemValue>,
    multis: HashMap<ItemId, Vec<ItemValue>>,
}

impl BuildResult {
    pub(crate) fn new(
        build_target_name: String,
        success: bool,
        diagnostics: Vec<Diagnostic>,
        duration: Duration,
        final_ids: HashSet<ItemId>,
        singles: HashMap<ItemId, ItemValue>,
        multis: HashMap<ItemId, Vec<ItemValue>>,
    ) -> Self {
        Self {
            build_target_name,
            success,
            diagnostics,
            duration,
            final_ids,
            singles,
            multis,
        }
    }

    pub fn build_target_name(&self) -> &str {
        &self.build_target_name
    }

    /// `false` if any step failed or recorded an error diagnostic.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Diagnostics in the order they were recorded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_error())
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn consume<T: BuildItem>(&self) -> Result<Option<Arc<T>>, ContextError> {
        self.consume_single(ItemId::of::<T>()?)
    }

    pub fn consume_named<T: BuildItem>(&self, name: impl Into<String>) -> Result<Option<Arc<T>>, ContextError> {
        self.consume_single(ItemId::named::<T>(name)?)
    }

    pub fn consume_multi<T: BuildItem>(&self) -> Result<Vec<Arc<T>>, ContextError> {
        self.consume_list(ItemId::of::<T>()?)
    }

    pub fn consume_multi_named<T: BuildItem>(&self, name: impl Into<String>) -> Result<Vec<Arc<T>>, ContextError> {
        self.consume_list(ItemId::named::<T>(name)?)
    }

    fn consume_single<T: BuildItem>(&self, id: ItemId) -> Result<Option<Arc<T>>, ContextError> {
        self.check_final(&id, false)?;
        self.singles
            .get(&id)
            .map(|value| downcast(&id, Arc::clone(value)))
            .transpose()
    }

    fn consume_list<T: BuildItem>(&self, id: ItemId) -> Result<Vec<Arc<T>>, ContextError> {
        self.check_final(&id, true)?;
        let values = self.multis.get(&id).cloned().unwrap_or_default();
        downcast_all(&id, values)
    }

    fn check_final(&self, id: &ItemId, as_multi: bool) -> Result<(), ContextError> {
        if !self.final_ids.contains(id) {
            return Err(ContextError::NotFinal { item: id.clone() });
        }
        if id.is_multi() != as_multi {
            return Err(ContextError::WrongMultiplicity {
                item: id.clone(),
                is_multi: id.is_multi(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildResult")
            .field("build_target_name", &self.build_target_name)
            .field("success", &self.success)
            .field("diagnostics", &self.diagnostics)
            .field("duration", &self.duration)
            .finish()
    }
}

/// Resolves to the [`BuildResult`] once every end step of a run has finished.
pub struct ExecutionHandle {
    build_target_name: String,
    receiver: oneshot::Receiver<BuildResult>,
}

impl ExecutionHandle {
    pub(crate) fn new(build_target_name: String, receiver: oneshot::Receiver<BuildResult>) -> Self {
        Self {
            build_target_name,
            receiver,
        }
    }

    pub async fn wait(self) -> Result<BuildResult, ExecutionError> {
        let build_target_name = self.build_target_name;
        self.receiver
            .await
            .map_err(|_| ExecutionError::Abandoned { build_target_name })
    }

    /// Blocks the current thread until the run completes.
    ///
    /// Must not be called from within an asynchronous execution context.
    pub fn wait_blocking(self) -> Result<BuildResult, ExecutionError> {
        let build_target_name = self.build_target_name;
        self.receiver
            .blocking_recv()
            .map_err(|_| ExecutionError::Abandoned { build_target_name })
    }
}
