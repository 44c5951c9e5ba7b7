// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::cmp::Ordering as CmpOrdering;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinError;
use tracing::Instrument;

use super::diagnostic::{Diagnostic, DiagnosticLevel};
use super::execution::Execution;
use super::step_info::StepInfo;
use super::values::{downcast, downcast_all};
use crate::errors::{ContextError, FailureStrategy};
use crate::item::{BuildItem, ItemId, ItemValue};
use crate::observability::messages::engine::{StepCompleted, StepFailed, StepSkipped, StepStarted};
use crate::observability::messages::StructuredLog;

/// What a running build step sees of the current run.
///
/// A step may only produce the items it declared as produced and read the
/// items it declared as consumed; anything else is rejected with a
/// [`ContextError`]. Order-only declarations grant no access.
///
/// A context exists only once its step has been released, so a step is
/// started exactly once per run.
pub struct StepContext {
    execution: Arc<Execution>,
    position: usize,
}

impl StepContext {
    pub(crate) fn new(execution: Arc<Execution>, position: usize) -> Self {
        Self { execution, position }
    }

    fn info(&self) -> &StepInfo {
        &self.execution.chain().steps()[self.position]
    }

    pub fn step_id(&self) -> &str {
        self.info().id()
    }

    pub fn build_target_name(&self) -> &str {
        self.execution.build_target_name()
    }

    /// The runtime executing this run; steps may spawn their own work on it.
    pub fn executor(&self) -> &Handle {
        self.execution.handle()
    }

    pub fn produce<T: BuildItem>(&self, value: T) -> Result<(), ContextError> {
        self.produce_value(ItemId::of::<T>()?, Arc::new(value))
    }

    pub fn produce_named<T: BuildItem>(&self, name: impl Into<String>, value: T) -> Result<(), ContextError> {
        self.produce_value(ItemId::named::<T>(name)?, Arc::new(value))
    }

    fn produce_value(&self, id: ItemId, value: ItemValue) -> Result<(), ContextError> {
        if !self.info().produces_item(&id) {
            return Err(ContextError::UndeclaredProduce {
                step: self.step_id().to_string(),
                item: id,
            });
        }
        if id.is_multi() {
            self.execution.add_multi(id, value);
            Ok(())
        } else {
            self.execution.put_single(self.step_id(), id, value)
        }
    }

    /// Reads a single-valued item; `None` if nothing produced it this run.
    pub fn consume<T: BuildItem>(&self) -> Result<Option<Arc<T>>, ContextError> {
        self.consume_single(ItemId::of::<T>()?)
    }

    pub fn consume_named<T: BuildItem>(&self, name: impl Into<String>) -> Result<Option<Arc<T>>, ContextError> {
        self.consume_single(ItemId::named::<T>(name)?)
    }

    /// Reads every value produced for a multi item so far.
    ///
    /// The returned list is the caller's own copy. It is sorted when the item
    /// type has a comparator and in arrival order otherwise.
    pub fn consume_multi<T: BuildItem>(&self) -> Result<Vec<Arc<T>>, ContextError> {
        self.consume_list(ItemId::of::<T>()?)
    }

    pub fn consume_multi_named<T: BuildItem>(&self, name: impl Into<String>) -> Result<Vec<Arc<T>>, ContextError> {
        self.consume_list(ItemId::named::<T>(name)?)
    }

    /// Like [`consume_multi`](Self::consume_multi), re-sorted with `compare`.
    pub fn consume_multi_sorted<T, F>(&self, mut compare: F) -> Result<Vec<Arc<T>>, ContextError>
    where
        T: BuildItem,
        F: FnMut(&T, &T) -> CmpOrdering,
    {
        let mut values = self.consume_multi::<T>()?;
        values.sort_by(|a, b| compare(a, b));
        Ok(values)
    }

    fn consume_single<T: Any + Send + Sync>(&self, id: ItemId) -> Result<Option<Arc<T>>, ContextError> {
        self.check_consume(&id, false)?;
        self.execution
            .single(&id)
            .map(|value| downcast(&id, value))
            .transpose()
    }

    fn consume_list<T: Any + Send + Sync>(&self, id: ItemId) -> Result<Vec<Arc<T>>, ContextError> {
        self.check_consume(&id, true)?;
        downcast_all(&id, self.execution.multi(&id))
    }

    fn check_consume(&self, id: &ItemId, as_multi: bool) -> Result<(), ContextError> {
        if !self.info().consumes_item(id) {
            return Err(ContextError::UndeclaredConsume {
                step: self.step_id().to_string(),
                item: id.clone(),
            });
        }
        if id.is_multi() != as_multi {
            return Err(ContextError::WrongMultiplicity {
                item: id.clone(),
                is_multi: id.is_multi(),
            });
        }
        Ok(())
    }

    /// Whether this step declared `id` as consumed and a value is present.
    pub fn is_available_to_consume(&self, id: &ItemId) -> bool {
        self.info().consumes_item(id) && self.execution.is_available(id)
    }

    /// Whether anything in the chain reads `id`; lets a step skip producing
    /// items nobody needs.
    pub fn is_consumed(&self, id: &ItemId) -> bool {
        self.execution.chain().is_consumed(id)
    }

    pub fn note(&self, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Note, None, message.into());
    }

    pub fn note_at(&self, location: impl Into<String>, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Note, Some(location.into()), message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Warning, None, message.into());
    }

    pub fn warn_at(&self, location: impl Into<String>, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Warning, Some(location.into()), message.into());
    }

    /// Records an error; the run will report failure once it drains.
    pub fn error(&self, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Error, None, message.into());
    }

    pub fn error_at(&self, location: impl Into<String>, message: impl Into<String>) {
        self.diagnose(DiagnosticLevel::Error, Some(location.into()), message.into());
    }

    fn diagnose(&self, level: DiagnosticLevel, location: Option<String>, message: String) {
        self.execution
            .record(Diagnostic::new(level, self.step_id(), location, message));
    }

    pub(crate) fn submit(self: Arc<Self>) {
        let handle = self.execution.handle().clone();
        handle.spawn(self.run());
    }

    fn run(self: Arc<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let skip = self.execution.failure_strategy() == FailureStrategy::SkipAfterError
                && self.execution.has_error();
            if skip {
                StepSkipped {
                    step_id: self.step_id(),
                }
                .log();
            } else {
                self.invoke().await;
            }
            self.finish();
        })
    }

    /// Runs the step body in its own task so a panic is contained to it.
    async fn invoke(self: &Arc<Self>) {
        let started = StepStarted {
            step_id: self.step_id(),
            build_target_name: self.build_target_name(),
        };
        let span = self.execution.span().in_scope(|| started.span("build_step"));
        span.in_scope(|| started.log());

        let build_step = Arc::clone(self.info().build_step());
        let context = Arc::clone(self);
        let started_at = Instant::now();
        let outcome = self
            .execution
            .handle()
            .spawn(async move { build_step.execute(&context).await }.instrument(span.clone()))
            .await;

        span.in_scope(|| match outcome {
            Ok(Ok(())) => StepCompleted {
                step_id: self.step_id(),
                duration: started_at.elapsed(),
            }
            .log(),
            Ok(Err(error)) => self.fail(format!("{error:#}")),
            Err(error) => self.fail(join_failure(error)),
        });
    }

    fn fail(&self, message: String) {
        StepFailed {
            step_id: self.step_id(),
            error: &message,
        }
        .log();
        self.diagnose(DiagnosticLevel::Error, None, message);
    }

    fn finish(&self) {
        let dependents = self.info().dependents();
        if dependents.is_empty() {
            self.execution.end_step_finished();
            return;
        }
        for &dependent in dependents {
            self.execution.dependency_finished(dependent);
        }
    }
}

fn join_failure(error: JoinError) -> String {
    if !error.is_panic() {
        return "build step was cancelled".to_string();
    }
    let payload = error.into_panic();
    let reason = payload
        .downcast_ref::<&str>()
        .map(|reason| reason.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("build step panicked: {reason}")
}
