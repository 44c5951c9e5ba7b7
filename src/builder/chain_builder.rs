// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Resolution of step declarations into an executable chain.
//!
//! # Build Pipeline
//!
//! [`ChainBuilder::build`] runs these stages in order and stops at the first
//! failure:
//!
//! 1. **Attachment**: every registered step must have logic attached
//! 2. **Producer index**: all produce declarations are indexed by item,
//!    rejecting a second real producer of a single-valued item and real
//!    producers of initial items
//! 3. **Inclusion**: starting from the final items, producers are pulled into
//!    the chain and every consume of an included step is wired to its
//!    producers (breadth-first work queue)
//! 4. **Cycle detection**: DFS with an on-stack set and a checked set over the
//!    included steps
//! 5. **Materialization**: included steps become [`StepInfo`] nodes with a
//!    dependency count and a dependent list
//!
//! Steps that no final item transitively needs are never included.
//!
//! ## Producer selection
//! For each needed item, non-overridable producers are used first. Only when
//! there are none do overridable producers get pulled in. Weak produces never
//! pull their step in, but still order an included step before the consumer.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::panic::Location;
use std::path::PathBuf;

use super::graph_output::write_graph;
use super::location::StepIndex;
use super::step_builder::{StepBuilder, StepDeclaration};
use crate::config::EngineConfig;
use crate::declaration::Produce;
use crate::engine::{Chain, StepInfo};
use crate::errors::ChainBuildError;
use crate::item::{BuildItem, ItemId};
use crate::observability::messages::builder::{
    ChainBuildCompleted, ChainBuildFailed, ChainBuildStarted, GraphOutputFailed, GraphOutputWritten,
};
use crate::observability::messages::StructuredLog;
use crate::traits::BuildStep;

type Dependencies = HashMap<StepIndex, Vec<Produce>>;

/// Collects build steps and item declarations, then resolves them into a
/// [`Chain`].
///
/// # Example
/// ```
/// use buildchain::builder::ChainBuilder;
/// use buildchain::item::{BuildItem, ItemKind};
/// use buildchain::traits::step_fn;
///
/// struct Config(String);
/// impl BuildItem for Config {
///     const KIND: ItemKind = ItemKind::Simple;
/// }
///
/// struct Report(String);
/// impl BuildItem for Report {
///     const KIND: ItemKind = ItemKind::Simple;
/// }
///
/// # fn main() -> Result<(), buildchain::errors::ChainBuildError> {
/// let mut builder = ChainBuilder::new();
/// builder
///     .add_build_step(step_fn("load-config", |context| {
///         context.produce(Config("release".into()))?;
///         Ok(())
///     }))
///     .produces::<Config>()?;
/// builder
///     .add_build_step(step_fn("report", |context| {
///         let config = context.consume::<Config>()?;
///         let mode = config.map(|c| c.0.clone()).unwrap_or_default();
///         context.produce(Report(format!("built in {mode} mode")))?;
///         Ok(())
///     }))
///     .consumes::<Config>()?
///     .produces::<Report>()?;
/// builder.add_final_item::<Report>()?;
///
/// let chain = builder.build()?;
/// assert_eq!(chain.step_count(), 2);
/// assert_eq!(chain.start_step_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ChainBuilder {
    steps: Vec<StepDeclaration>,
    initial_ids: HashSet<ItemId>,
    final_ids: HashSet<ItemId>,
    graph_output: Option<PathBuf>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that honours the builder-side options of `config`.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            graph_output: config.graph_output.clone(),
            ..Self::default()
        }
    }

    /// Writes a DOT rendering of every successfully built chain to `path`.
    pub fn set_graph_output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.graph_output = Some(path.into());
        self
    }

    /// Registers a step running `step` and returns its builder.
    #[track_caller]
    pub fn add_build_step(&mut self, step: impl BuildStep) -> StepBuilder<'_> {
        let mut builder = self.add_step();
        builder.set_build_step(step);
        builder
    }

    /// Registers a step whose logic is attached later with
    /// [`StepBuilder::set_build_step`].
    #[track_caller]
    pub fn add_step(&mut self) -> StepBuilder<'_> {
        let index = StepIndex(self.steps.len());
        self.steps.push(StepDeclaration::new(index, Location::caller()));
        StepBuilder::new(&mut self.steps[index.0])
    }

    /// Reopens a registered step for further configuration.
    pub fn step(&mut self, index: StepIndex) -> Option<StepBuilder<'_>> {
        self.steps.get_mut(index.0).map(StepBuilder::new)
    }

    /// Declares an item supplied by the caller before any step runs.
    ///
    /// No step may be a real producer of a single-valued initial item.
    pub fn add_initial(&mut self, id: ItemId) -> &mut Self {
        self.initial_ids.insert(id);
        self
    }

    pub fn add_initial_item<T: BuildItem>(&mut self) -> Result<&mut Self, ChainBuildError> {
        Ok(self.add_initial(ItemId::of::<T>()?))
    }

    /// Declares an item the chain must deliver; its producers seed inclusion.
    pub fn add_final(&mut self, id: ItemId) -> &mut Self {
        self.final_ids.insert(id);
        self
    }

    pub fn add_final_item<T: BuildItem>(&mut self) -> Result<&mut Self, ChainBuildError> {
        Ok(self.add_final(ItemId::of::<T>()?))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Resolves the current declarations into an immutable chain.
    ///
    /// Later changes to this builder do not affect the returned chain.
    pub fn build(&self) -> Result<Chain, ChainBuildError> {
        ChainBuildStarted {
            step_count: self.steps.len(),
            initial_count: self.initial_ids.len(),
            final_count: self.final_ids.len(),
        }
        .log();

        match self.try_build() {
            Ok(chain) => {
                ChainBuildCompleted {
                    included_steps: chain.step_count(),
                    start_steps: chain.start_step_count(),
                    end_steps: chain.end_step_count(),
                }
                .log();
                self.output_graph(&chain);
                Ok(chain)
            }
            Err(error) => {
                ChainBuildFailed { error: &error }.log();
                Err(error)
            }
        }
    }

    fn try_build(&self) -> Result<Chain, ChainBuildError> {
        self.check_attached()?;
        let all_produces = self.extract_producers()?;

        let mut included = BTreeSet::new();
        let dependencies = self.wire_dependencies(&all_produces, &mut included)?;

        self.detect_cycles(&included, &dependencies)?;
        self.build_all_steps(&included, &dependencies)
    }

    fn check_attached(&self) -> Result<(), ChainBuildError> {
        match self.steps.iter().find(|step| step.build_step().is_none()) {
            Some(step) => Err(ChainBuildError::UnattachedStep {
                step: step.location(),
            }),
            None => Ok(()),
        }
    }

    /// Indexes every produce by item, enforcing the single-real-producer rule.
    fn extract_producers(&self) -> Result<HashMap<ItemId, Vec<Produce>>, ChainBuildError> {
        let mut all_produces: HashMap<ItemId, Vec<Produce>> = HashMap::new();
        for step in &self.steps {
            for (id, to_add) in step.produces() {
                let list = all_produces.entry(id.clone()).or_default();
                if !id.is_multi() && to_add.is_real() {
                    if self.initial_ids.contains(id) {
                        return Err(ChainBuildError::ProducesInitial {
                            item: id.clone(),
                            step: step.location(),
                        });
                    }
                    let overridable = to_add.is_overridable();
                    if let Some(existing) = list
                        .iter()
                        .find(|produce| produce.is_real() && produce.is_overridable() == overridable)
                    {
                        return Err(ChainBuildError::ConflictingProducers {
                            item: id.clone(),
                            existing: self.steps[existing.step().0].location(),
                            conflicting: step.location(),
                            overridable,
                        });
                    }
                }
                list.push(to_add.clone());
            }
        }
        Ok(all_produces)
    }

    /// Pulls in the producers of the final items and, transitively, of
    /// everything an included step consumes. Returns consumer -> produces.
    fn wire_dependencies(
        &self,
        all_produces: &HashMap<ItemId, Vec<Produce>>,
        included: &mut BTreeSet<StepIndex>,
    ) -> Result<Dependencies, ChainBuildError> {
        let mut to_add = VecDeque::new();
        for final_id in &self.final_ids {
            add_item(all_produces, included, &mut to_add, final_id, None);
        }

        let mut dependencies = Dependencies::new();
        while let Some(index) = to_add.pop_front() {
            let step = &self.steps[index.0];
            for (id, consume) in step.consumes() {
                let required = !consume.is_optional() && !id.is_multi();
                if required && !self.initial_ids.contains(id) && !all_produces.contains_key(id) {
                    return Err(ChainBuildError::MissingProducer {
                        item: id.clone(),
                        step: step.location(),
                    });
                }
                let step_dependencies = dependencies.entry(index).or_default();
                add_item(all_produces, included, &mut to_add, id, Some(step_dependencies));
            }
        }
        Ok(dependencies)
    }

    fn detect_cycles(
        &self,
        included: &BTreeSet<StepIndex>,
        dependencies: &Dependencies,
    ) -> Result<(), ChainBuildError> {
        let mut on_stack = HashSet::new();
        let mut checked = HashSet::new();
        let mut path = Vec::new();
        for &index in included {
            self.visit_for_cycles(index, included, dependencies, &mut on_stack, &mut checked, &mut path)?;
        }
        Ok(())
    }

    fn visit_for_cycles<'a>(
        &self,
        index: StepIndex,
        included: &BTreeSet<StepIndex>,
        dependencies: &'a Dependencies,
        on_stack: &mut HashSet<StepIndex>,
        checked: &mut HashSet<StepIndex>,
        path: &mut Vec<&'a Produce>,
    ) -> Result<(), ChainBuildError> {
        if checked.contains(&index) {
            return Ok(());
        }
        if !on_stack.insert(index) {
            return Err(self.cycle_error(index, path));
        }
        for produce in dependencies.get(&index).into_iter().flatten() {
            if !included.contains(&produce.step()) {
                continue;
            }
            path.push(produce);
            let result =
                self.visit_for_cycles(produce.step(), included, dependencies, on_stack, checked, path);
            path.pop();
            result?;
        }
        on_stack.remove(&index);
        checked.insert(index);
        Ok(())
    }

    /// Renders the hops of a cycle that closes at `index`.
    ///
    /// The last produce on `path` belongs to `index`; the cycle starts right
    /// after the previous produce of `index`, or at the root of the walk.
    fn cycle_error(&self, index: StepIndex, path: &[&Produce]) -> ChainBuildError {
        let closing = path.len().saturating_sub(1);
        let start = path[..closing]
            .iter()
            .rposition(|produce| produce.step() == index)
            .map_or(0, |position| position + 1);

        let mut hops: Vec<String> = path[start..]
            .iter()
            .rev()
            .map(|produce| format!("{} produced {}", self.steps[produce.step().0].step_id(), produce.item()))
            .collect();
        hops.push(self.steps[index.0].step_id());
        ChainBuildError::CycleDetected { path: hops }
    }

    fn build_all_steps(
        &self,
        included: &BTreeSet<StepIndex>,
        dependencies: &Dependencies,
    ) -> Result<Chain, ChainBuildError> {
        let order: Vec<StepIndex> = included.iter().copied().collect();
        let position: HashMap<StepIndex, usize> = order
            .iter()
            .enumerate()
            .map(|(position, index)| (*index, position))
            .collect();

        let mut depends_on = vec![BTreeSet::new(); order.len()];
        let mut dependents = vec![BTreeSet::new(); order.len()];
        for (consumer, produces) in dependencies {
            let Some(&consumer) = position.get(consumer) else {
                continue;
            };
            for produce in produces {
                if let Some(&producer) = position.get(&produce.step()) {
                    depends_on[consumer].insert(producer);
                    dependents[producer].insert(consumer);
                }
            }
        }

        let mut consumed: HashSet<ItemId> = self.final_ids.clone();
        let mut steps = Vec::with_capacity(order.len());
        for (position, index) in order.iter().enumerate() {
            let step = &self.steps[index.0];
            let build_step = step
                .build_step()
                .cloned()
                .ok_or_else(|| ChainBuildError::UnattachedStep {
                    step: step.location(),
                })?;
            let produces = step
                .produces()
                .values()
                .filter(|produce| produce.is_real())
                .map(|produce| produce.item().clone())
                .collect();
            let consumes: HashSet<ItemId> = step
                .consumes()
                .values()
                .filter(|consume| consume.is_real())
                .map(|consume| consume.item().clone())
                .collect();
            consumed.extend(consumes.iter().cloned());

            steps.push(StepInfo::new(
                step.step_id(),
                build_step,
                depends_on[position].len(),
                dependents[position].iter().copied().collect(),
                produces,
                consumes,
            ));
        }

        Ok(Chain::new(
            steps,
            consumed,
            self.initial_ids.clone(),
            self.final_ids.clone(),
        ))
    }

    fn output_graph(&self, chain: &Chain) {
        let Some(path) = &self.graph_output else {
            return;
        };
        match write_graph(path, chain) {
            Ok(()) => GraphOutputWritten { path }.log(),
            Err(error) => GraphOutputFailed { path, error: &error }.log(),
        }
    }
}

/// Includes the producers of `id`, preferring non-overridable ones.
fn add_item(
    all_produces: &HashMap<ItemId, Vec<Produce>>,
    included: &mut BTreeSet<StepIndex>,
    to_add: &mut VecDeque<StepIndex>,
    id: &ItemId,
    mut dependencies: Option<&mut Vec<Produce>>,
) {
    let modified = produce_item(all_produces, included, to_add, id, dependencies.as_deref_mut(), false);
    if !modified {
        produce_item(all_produces, included, to_add, id, dependencies, true);
    }
}

fn produce_item(
    all_produces: &HashMap<ItemId, Vec<Produce>>,
    included: &mut BTreeSet<StepIndex>,
    to_add: &mut VecDeque<StepIndex>,
    id: &ItemId,
    mut dependencies: Option<&mut Vec<Produce>>,
    overridable: bool,
) -> bool {
    let mut modified = false;
    for produce in all_produces.get(id).into_iter().flatten() {
        if produce.is_overridable() != overridable {
            continue;
        }
        if !produce.is_weak() && included.insert(produce.step()) {
            to_add.push_back(produce.step());
        }
        if let Some(dependencies) = dependencies.as_deref_mut() {
            dependencies.push(produce.clone());
        }
        modified = true;
    }
    modified
}
