// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use super::kind::{BuildItem, ItemType};
use crate::errors::ItemIdError;

/// Key identifying one kind of produced or consumed value.
///
/// Two identifiers are equal when they share the same item type and name.
/// Multiplicity is never stored: it is read off the item type's kind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ItemId {
    item_type: ItemType,
    name: Option<String>,
}

impl ItemId {
    /// Builds an identifier, enforcing that named kinds carry a name and
    /// unnamed kinds do not.
    pub fn new(item_type: ItemType, name: Option<String>) -> Result<Self, ItemIdError> {
        match (item_type.kind().is_named(), name.is_some()) {
            (true, false) => Err(ItemIdError::MissingName {
                item_type: item_type.type_name(),
            }),
            (false, true) => Err(ItemIdError::UnexpectedName {
                item_type: item_type.type_name(),
                name: name.unwrap_or_default(),
            }),
            _ => Ok(Self { item_type, name }),
        }
    }

    /// Identifier for an unnamed item type.
    pub fn of<T: BuildItem>() -> Result<Self, ItemIdError> {
        Self::new(ItemType::of::<T>(), None)
    }

    /// Identifier for a named item type.
    pub fn named<T: BuildItem>(name: impl Into<String>) -> Result<Self, ItemIdError> {
        Self::new(ItemType::of::<T>(), Some(name.into()))
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_multi(&self) -> bool {
        self.item_type.kind().is_multi()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}[{}]", self.item_type, name),
            None => write!(f, "{}", self.item_type),
        }
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemId")
            .field("type", &self.item_type.type_name())
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use std::collections::HashSet;

    struct Simple;
    impl BuildItem for Simple {
        const KIND: ItemKind = ItemKind::Simple;
    }

    struct Named;
    impl BuildItem for Named {
        const KIND: ItemKind = ItemKind::NamedSimple;
    }

    struct NamedList;
    impl BuildItem for NamedList {
        const KIND: ItemKind = ItemKind::NamedMulti;
    }

    #[test]
    fn test_named_kind_requires_name() {
        let result = ItemId::of::<Named>();
        assert!(matches!(result, Err(ItemIdError::MissingName { .. })));
    }

    #[test]
    fn test_unnamed_kind_rejects_name() {
        let result = ItemId::named::<Simple>("oops");
        assert!(matches!(result, Err(ItemIdError::UnexpectedName { .. })));
    }

    #[test]
    fn test_equality_uses_type_and_name() {
        let a = ItemId::named::<Named>("a").unwrap();
        let a_again = ItemId::named::<Named>("a").unwrap();
        let b = ItemId::named::<Named>("b").unwrap();

        assert_eq!(a, a_again);
        assert_ne!(a, b);

        let set: HashSet<ItemId> = [a, a_again, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_multiplicity_follows_kind() {
        assert!(!ItemId::of::<Simple>().unwrap().is_multi());
        assert!(ItemId::named::<NamedList>("x").unwrap().is_multi());
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemId::of::<Simple>().unwrap().to_string(), "Simple");
        assert_eq!(ItemId::named::<Named>("db").unwrap().to_string(), "Named[db]");
    }
}
