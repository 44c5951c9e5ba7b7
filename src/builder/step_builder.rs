// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;

use super::location::{StepIndex, StepLocation};
use crate::declaration::{
    Constraint, Consume, ConsumeFlag, ConsumeFlags, Produce, ProduceFlags,
};
use crate::errors::ChainBuildError;
use crate::item::{BuildItem, ItemId};
use crate::traits::BuildStep;

/// Everything declared for one step before the chain is built.
pub(crate) struct StepDeclaration {
    index: StepIndex,
    build_step: Option<Arc<dyn BuildStep>>,
    produces: HashMap<ItemId, Produce>,
    consumes: HashMap<ItemId, Consume>,
    registered_at: &'static Location<'static>,
}

impl StepDeclaration {
    pub(crate) fn new(index: StepIndex, registered_at: &'static Location<'static>) -> Self {
        Self {
            index,
            build_step: None,
            produces: HashMap::new(),
            consumes: HashMap::new(),
            registered_at,
        }
    }

    pub(crate) fn build_step(&self) -> Option<&Arc<dyn BuildStep>> {
        self.build_step.as_ref()
    }

    pub(crate) fn produces(&self) -> &HashMap<ItemId, Produce> {
        &self.produces
    }

    pub(crate) fn consumes(&self) -> &HashMap<ItemId, Consume> {
        &self.consumes
    }

    pub(crate) fn step_id(&self) -> String {
        match &self.build_step {
            Some(step) => step.id(),
            None => format!("<unattached step #{}>", self.index.0),
        }
    }

    pub(crate) fn location(&self) -> StepLocation {
        StepLocation::new(self.step_id(), self.registered_at)
    }
}

/// Mutable handle for configuring one registered step.
///
/// Obtained from [`ChainBuilder::add_build_step`](super::ChainBuilder::add_build_step).
/// Only the configuration present when the chain is built takes effect.
///
/// ```
/// use buildchain::builder::ChainBuilder;
/// use buildchain::item::{BuildItem, ItemKind};
/// use buildchain::traits::step_fn;
///
/// struct Source(u32);
/// impl BuildItem for Source {
///     const KIND: ItemKind = ItemKind::Simple;
/// }
///
/// # fn main() -> Result<(), buildchain::errors::ChainBuildError> {
/// let mut builder = ChainBuilder::new();
/// builder
///     .add_build_step(step_fn("source", |context| {
///         context.produce(Source(7))?;
///         Ok(())
///     }))
///     .produces::<Source>()?;
/// builder.add_final_item::<Source>()?;
/// let chain = builder.build()?;
/// assert_eq!(chain.step_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct StepBuilder<'a> {
    declaration: &'a mut StepDeclaration,
}

impl<'a> StepBuilder<'a> {
    pub(crate) fn new(declaration: &'a mut StepDeclaration) -> Self {
        Self { declaration }
    }

    pub fn index(&self) -> StepIndex {
        self.declaration.index
    }

    /// Attaches the logic this step runs; replaces any earlier step.
    pub fn set_build_step(&mut self, step: impl BuildStep) -> &mut Self {
        self.declaration.build_step = Some(Arc::new(step));
        self
    }

    /// Declares that the step emits `id`.
    pub fn add_produces(
        &mut self,
        id: ItemId,
        flags: ProduceFlags,
    ) -> Result<&mut Self, ChainBuildError> {
        self.declare_produce(id, Constraint::Real, flags)
    }

    /// Declares that the step reads `id`.
    pub fn add_consumes(&mut self, id: ItemId, flags: ConsumeFlags) -> &mut Self {
        self.declare_consume(id, Constraint::Real, flags);
        self
    }

    /// Orders this step before every consumer of `id` without producing it.
    pub fn before_consume(&mut self, id: ItemId) -> Result<&mut Self, ChainBuildError> {
        self.declare_produce(id, Constraint::OrderOnly, ProduceFlags::none())
    }

    /// Orders this step after every producer of `id` without consuming it.
    pub fn after_produce(&mut self, id: ItemId) -> &mut Self {
        self.declare_consume(id, Constraint::OrderOnly, ConsumeFlags::of(ConsumeFlag::Optional));
        self
    }

    pub fn produces<T: BuildItem>(&mut self) -> Result<&mut Self, ChainBuildError> {
        self.add_produces(ItemId::of::<T>()?, ProduceFlags::none())
    }

    pub fn produces_with<T: BuildItem>(
        &mut self,
        flags: ProduceFlags,
    ) -> Result<&mut Self, ChainBuildError> {
        self.add_produces(ItemId::of::<T>()?, flags)
    }

    pub fn produces_named<T: BuildItem>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut Self, ChainBuildError> {
        self.add_produces(ItemId::named::<T>(name)?, ProduceFlags::none())
    }

    pub fn consumes<T: BuildItem>(&mut self) -> Result<&mut Self, ChainBuildError> {
        Ok(self.add_consumes(ItemId::of::<T>()?, ConsumeFlags::none()))
    }

    pub fn consumes_optional<T: BuildItem>(&mut self) -> Result<&mut Self, ChainBuildError> {
        Ok(self.add_consumes(ItemId::of::<T>()?, ConsumeFlags::of(ConsumeFlag::Optional)))
    }

    pub fn consumes_named<T: BuildItem>(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut Self, ChainBuildError> {
        Ok(self.add_consumes(ItemId::named::<T>(name)?, ConsumeFlags::none()))
    }

    fn declare_produce(
        &mut self,
        id: ItemId,
        constraint: Constraint,
        flags: ProduceFlags,
    ) -> Result<&mut Self, ChainBuildError> {
        let index = self.declaration.index;
        match self.declaration.produces.entry(id) {
            Entry::Occupied(mut entry) => match entry.get().combine(constraint, flags) {
                Some(merged) => {
                    entry.insert(merged);
                }
                None => {
                    let item = entry.key().clone();
                    return Err(ChainBuildError::ConflictingDeclaration {
                        item,
                        step: self.declaration.location(),
                    });
                }
            },
            Entry::Vacant(entry) => {
                let produce = Produce::new(index, entry.key().clone(), constraint, flags);
                entry.insert(produce);
            }
        }
        Ok(self)
    }

    fn declare_consume(&mut self, id: ItemId, constraint: Constraint, flags: ConsumeFlags) {
        let index = self.declaration.index;
        match self.declaration.consumes.entry(id) {
            Entry::Occupied(mut entry) => {
                let merged = entry.get().combine(constraint, flags);
                entry.insert(merged);
            }
            Entry::Vacant(entry) => {
                let consume = Consume::new(index, entry.key().clone(), constraint, flags);
                entry.insert(consume);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ProduceFlag;
    use crate::item::ItemKind;
    use crate::traits::step_fn;

    struct Artifact;
    impl BuildItem for Artifact {
        const KIND: ItemKind = ItemKind::Simple;
    }

    struct Setting;
    impl BuildItem for Setting {
        const KIND: ItemKind = ItemKind::NamedSimple;
    }

    fn declaration() -> StepDeclaration {
        StepDeclaration::new(StepIndex(3), Location::caller())
    }

    #[test]
    fn test_declarations_are_recorded() {
        let mut declaration = declaration();
        let mut builder = StepBuilder::new(&mut declaration);
        builder
            .produces::<Artifact>()
            .unwrap()
            .consumes_named::<Setting>("port")
            .unwrap();

        let artifact = ItemId::of::<Artifact>().unwrap();
        let setting = ItemId::named::<Setting>("port").unwrap();
        assert!(declaration.produces()[&artifact].is_real());
        assert_eq!(declaration.produces()[&artifact].step(), StepIndex(3));
        assert!(!declaration.consumes()[&setting].is_optional());
    }

    #[test]
    fn test_named_item_without_name_is_rejected() {
        let mut declaration = declaration();
        let result = StepBuilder::new(&mut declaration).consumes::<Setting>().map(|_| ());
        assert!(matches!(result, Err(ChainBuildError::InvalidItem(_))));
    }

    #[test]
    fn test_conflicting_produce_flags_are_rejected() {
        let mut declaration = declaration();
        let mut builder = StepBuilder::new(&mut declaration);
        builder.produces::<Artifact>().unwrap();
        let result = builder
            .produces_with::<Artifact>(ProduceFlags::of(ProduceFlag::Overridable))
            .map(|_| ());
        assert!(matches!(
            result,
            Err(ChainBuildError::ConflictingDeclaration { .. })
        ));
    }

    #[test]
    fn test_order_only_declarations_merge_with_real_ones() {
        let artifact = ItemId::of::<Artifact>().unwrap();
        let mut declaration = declaration();
        let mut builder = StepBuilder::new(&mut declaration);
        builder.after_produce(artifact.clone());
        builder.consumes::<Artifact>().unwrap();

        let consume = &declaration.consumes()[&artifact];
        assert!(consume.is_real());
        assert!(!consume.is_optional());
    }

    #[test]
    fn test_repeated_consumes_merge_without_failing() {
        let artifact = ItemId::of::<Artifact>().unwrap();
        let mut declaration = declaration();
        StepBuilder::new(&mut declaration)
            .add_consumes(artifact.clone(), ConsumeFlags::of(ConsumeFlag::Optional))
            .add_consumes(artifact.clone(), ConsumeFlags::none())
            .after_produce(artifact.clone());

        let consume = &declaration.consumes()[&artifact];
        assert!(consume.is_real());
        assert!(!consume.is_optional());
    }

    #[test]
    fn test_step_id_falls_back_when_unattached() {
        let mut declaration = declaration();
        assert_eq!(declaration.step_id(), "<unattached step #3>");

        StepBuilder::new(&mut declaration).set_build_step(step_fn("compile", |_| Ok(())));
        assert_eq!(declaration.step_id(), "compile");
        assert!(declaration.build_step().is_some());
    }
}
