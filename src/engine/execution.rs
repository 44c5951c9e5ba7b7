// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-run shared state.
//!
//! An [`Execution`] is created for every run and owns everything steps share
//! while the run is in flight:
//!
//! - single-valued items in a concurrent map, written put-if-absent
//! - multi-valued items as one lock-protected list per identifier
//! - the diagnostics list and the run-wide error flag
//! - the countdown of end steps that have not finished yet
//! - one countdown of unfinished dependencies per step
//!
//! A [`StepContext`] is only created when its step is released, and only
//! running tasks hold one. Dropping those tasks, for example when the runtime
//! shuts down, drops the run state and abandons the [`ExecutionHandle`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::Span;

use super::chain::Chain;
use super::context::StepContext;
use super::diagnostic::{Diagnostic, DiagnosticLevel};
use super::result::{BuildResult, ExecutionHandle};
use super::values::{insert_value, lock};
use crate::errors::{ContextError, FailureStrategy};
use crate::item::{BuildItem, ItemId, ItemValue};
use crate::observability::messages::engine::{
    DiagnosticRecorded, ExecutionCompleted, ExecutionFailed, ExecutionStarted,
};
use crate::observability::messages::StructuredLog;

/// Prepares one run of a [`Chain`].
///
/// Values for the chain's initial items are supplied here before the run
/// starts. Only identifiers declared initial on the chain builder are
/// accepted.
///
/// ```
/// use buildchain::builder::ChainBuilder;
/// use buildchain::item::{BuildItem, ItemKind};
/// use buildchain::traits::step_fn;
///
/// struct Version(u32);
/// impl BuildItem for Version {
///     const KIND: ItemKind = ItemKind::Simple;
/// }
///
/// struct Banner(String);
/// impl BuildItem for Banner {
///     const KIND: ItemKind = ItemKind::Simple;
/// }
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let mut builder = ChainBuilder::new();
/// builder.add_initial_item::<Version>()?;
/// builder
///     .add_build_step(step_fn("banner", |context| {
///         let version = context.consume::<Version>()?.map(|v| v.0).unwrap_or_default();
///         context.produce(Banner(format!("v{version}")))?;
///         Ok(())
///     }))
///     .consumes::<Version>()?
///     .produces::<Banner>()?;
/// builder.add_final_item::<Banner>()?;
/// let chain = builder.build()?;
///
/// let mut execution = chain.execution_builder("release");
/// execution.produce(Version(3))?;
/// let result = execution.execute(&tokio::runtime::Handle::current()).wait().await?;
///
/// assert!(result.is_success());
/// assert_eq!(result.consume::<Banner>()?.map(|b| b.0.clone()), Some("v3".to_string()));
/// # Ok(())
/// # }
/// ```
pub struct ExecutionBuilder {
    chain: Chain,
    build_target_name: String,
    failure_strategy: FailureStrategy,
    singles: HashMap<ItemId, ItemValue>,
    multis: HashMap<ItemId, Vec<ItemValue>>,
}

impl ExecutionBuilder {
    pub(crate) fn new(chain: Chain, build_target_name: String) -> Self {
        Self {
            chain,
            build_target_name,
            failure_strategy: FailureStrategy::default(),
            singles: HashMap::new(),
            multis: HashMap::new(),
        }
    }

    pub fn failure_strategy(&mut self, strategy: FailureStrategy) -> &mut Self {
        self.failure_strategy = strategy;
        self
    }

    /// Supplies a value for an unnamed initial item.
    pub fn produce<T: BuildItem>(&mut self, value: T) -> Result<&mut Self, ContextError> {
        let id = ItemId::of::<T>()?;
        self.produce_value(id, Arc::new(value))
    }

    /// Supplies a value for a named initial item.
    pub fn produce_named<T: BuildItem>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<&mut Self, ContextError> {
        let id = ItemId::named::<T>(name)?;
        self.produce_value(id, Arc::new(value))
    }

    fn produce_value(&mut self, id: ItemId, value: ItemValue) -> Result<&mut Self, ContextError> {
        if !self.chain.is_initial(&id) {
            return Err(ContextError::NotInitial { item: id });
        }
        if id.is_multi() {
            let comparator = id.item_type().comparator();
            insert_value(self.multis.entry(id).or_default(), value, comparator);
        } else if self.singles.contains_key(&id) {
            return Err(ContextError::CannotMulti {
                step: format!("initial values of '{}'", self.build_target_name),
                item: id,
            });
        } else {
            self.singles.insert(id, value);
        }
        Ok(self)
    }

    /// Starts the run on `handle`. Ready steps are spawned immediately.
    pub fn execute(self, handle: &Handle) -> ExecutionHandle {
        let (sender, receiver) = oneshot::channel();
        let build_target_name = self.build_target_name.clone();
        let execution = Arc::new(Execution::new(self, handle.clone(), sender));
        execution.start();
        ExecutionHandle::new(build_target_name, receiver)
    }
}

pub(crate) struct Execution {
    chain: Chain,
    build_target_name: String,
    handle: Handle,
    failure_strategy: FailureStrategy,
    singles: DashMap<ItemId, ItemValue>,
    multis: DashMap<ItemId, Arc<Mutex<Vec<ItemValue>>>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_recorded: AtomicBool,
    remaining_end_steps: AtomicUsize,
    remaining_dependencies: Vec<AtomicUsize>,
    completion: Mutex<Option<oneshot::Sender<BuildResult>>>,
    started_at: Instant,
    span: Span,
}

impl Execution {
    fn new(builder: ExecutionBuilder, handle: Handle, sender: oneshot::Sender<BuildResult>) -> Self {
        let ExecutionBuilder {
            chain,
            build_target_name,
            failure_strategy,
            singles,
            multis,
        } = builder;

        let started = ExecutionStarted {
            build_target_name: &build_target_name,
            step_count: chain.step_count(),
            start_steps: chain.start_step_count(),
        };
        started.log();
        let span = started.span("execution");

        Self {
            remaining_dependencies: chain
                .steps()
                .iter()
                .map(|step| AtomicUsize::new(step.dependency_count()))
                .collect(),
            remaining_end_steps: AtomicUsize::new(chain.end_step_count()),
            singles: singles.into_iter().collect(),
            multis: multis
                .into_iter()
                .map(|(id, values)| (id, Arc::new(Mutex::new(values))))
                .collect(),
            diagnostics: Mutex::new(Vec::new()),
            error_recorded: AtomicBool::new(false),
            completion: Mutex::new(Some(sender)),
            started_at: Instant::now(),
            chain,
            build_target_name,
            handle,
            failure_strategy,
            span,
        }
    }

    fn start(self: &Arc<Self>) {
        if self.chain.end_step_count() == 0 {
            self.complete();
            return;
        }
        for &position in self.chain.start_steps() {
            Arc::new(StepContext::new(Arc::clone(self), position)).submit();
        }
    }

    pub(crate) fn chain(&self) -> &Chain {
        &self.chain
    }

    pub(crate) fn build_target_name(&self) -> &str {
        &self.build_target_name
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    pub(crate) fn failure_strategy(&self) -> FailureStrategy {
        self.failure_strategy
    }

    pub(crate) fn has_error(&self) -> bool {
        self.error_recorded.load(Ordering::Acquire)
    }

    /// Called once by each dependency of the step at `position` after it has
    /// finished. The call that brings the count to zero submits the step.
    pub(crate) fn dependency_finished(self: &Arc<Self>, position: usize) {
        if self.remaining_dependencies[position].fetch_sub(1, Ordering::AcqRel) == 1 {
            Arc::new(StepContext::new(Arc::clone(self), position)).submit();
        }
    }

    pub(crate) fn put_single(&self, step_id: &str, id: ItemId, value: ItemValue) -> Result<(), ContextError> {
        match self.singles.entry(id) {
            Entry::Occupied(entry) => Err(ContextError::CannotMulti {
                step: step_id.to_string(),
                item: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    pub(crate) fn add_multi(&self, id: ItemId, value: ItemValue) {
        let comparator = id.item_type().comparator();
        let list = Arc::clone(self.multis.entry(id).or_default().value());
        insert_value(&mut lock(&*list), value, comparator);
    }

    pub(crate) fn single(&self, id: &ItemId) -> Option<ItemValue> {
        self.singles.get(id).map(|value| Arc::clone(value.value()))
    }

    /// Snapshot of the values produced so far for a multi item.
    pub(crate) fn multi(&self, id: &ItemId) -> Vec<ItemValue> {
        let list = self.multis.get(id).map(|list| Arc::clone(list.value()));
        match list {
            Some(list) => lock(&*list).clone(),
            None => Vec::new(),
        }
    }

    pub(crate) fn is_available(&self, id: &ItemId) -> bool {
        if id.is_multi() {
            !self.multi(id).is_empty()
        } else {
            self.singles.contains_key(id)
        }
    }

    pub(crate) fn record(&self, diagnostic: Diagnostic) {
        DiagnosticRecorded {
            diagnostic: &diagnostic,
        }
        .log();
        if diagnostic.level() == DiagnosticLevel::Error {
            self.error_recorded.store(true, Ordering::Release);
        }
        lock(&self.diagnostics).push(diagnostic);
    }

    /// Called once by every end step after it has finished.
    pub(crate) fn end_step_finished(&self) {
        if self.remaining_end_steps.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.complete();
        }
    }

    /// Builds the result once the last end step has finished. Every other
    /// step finished before its dependents, and a step only borrows its
    /// context while it executes, so no diagnostic can be recorded later.
    fn complete(&self) {
        let duration = self.started_at.elapsed();
        let diagnostics = std::mem::take(&mut *lock(&self.diagnostics));
        let success = !self.has_error();

        let _entered = self.span.enter();
        if success {
            ExecutionCompleted {
                build_target_name: &self.build_target_name,
                step_count: self.chain.step_count(),
                diagnostic_count: diagnostics.len(),
                duration,
            }
            .log();
        } else {
            ExecutionFailed {
                build_target_name: &self.build_target_name,
                error_count: diagnostics.iter().filter(|d| d.is_error()).count(),
                duration,
            }
            .log();
        }

        let mut singles = HashMap::new();
        let mut multis = HashMap::new();
        for id in self.chain.final_ids() {
            if id.is_multi() {
                multis.insert(id.clone(), self.multi(id));
            } else if let Some(value) = self.single(id) {
                singles.insert(id.clone(), value);
            }
        }

        let result = BuildResult::new(
            self.build_target_name.clone(),
            success,
            diagnostics,
            duration,
            self.chain.final_ids().clone(),
            singles,
            multis,
        );
        if let Some(sender) = lock(&self.completion).take() {
            // the handle may have been dropped; nobody is waiting then
            let _ = sender.send(result);
        }
    }
}
