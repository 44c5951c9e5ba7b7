// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Comparator over two type-erased values of the same item type.
pub type ItemComparator = fn(&dyn Any, &dyn Any) -> Ordering;

/// The closed set of item shapes a chain understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// At most one value per run, no name.
    Simple,
    /// Any number of values per run, aggregated into a list.
    Multi,
    /// At most one value per run and name.
    NamedSimple,
    /// Any number of values per run and name.
    NamedMulti,
}

impl ItemKind {
    pub fn is_multi(self) -> bool {
        matches!(self, ItemKind::Multi | ItemKind::NamedMulti)
    }

    pub fn is_named(self) -> bool {
        matches!(self, ItemKind::NamedSimple | ItemKind::NamedMulti)
    }
}

/// A value type that can be produced and consumed by build steps.
///
/// `KIND` fixes the multiplicity and naming rules for every identifier built
/// from this type. Multi items whose values have a natural order can return
/// [`natural_order`] from `comparator` so that aggregated lists are kept
/// sorted as values arrive.
///
/// ```
/// use buildchain::item::{natural_order, BuildItem, ItemComparator, ItemKind};
///
/// #[derive(PartialEq, Eq, PartialOrd, Ord)]
/// struct Priority(u32);
///
/// impl BuildItem for Priority {
///     const KIND: ItemKind = ItemKind::Multi;
///
///     fn comparator() -> Option<ItemComparator> {
///         Some(natural_order::<Self>)
///     }
/// }
/// ```
pub trait BuildItem: Any + Send + Sync {
    const KIND: ItemKind;

    fn comparator() -> Option<ItemComparator> {
        None
    }
}

/// Orders two erased values by `T`'s `Ord` implementation.
///
/// Values that are not a `T` compare as equal.
pub fn natural_order<T: Ord + 'static>(a: &dyn Any, b: &dyn Any) -> Ordering {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Runtime type tag of a [`BuildItem`].
///
/// Equality and hashing use the `TypeId` only; kind and comparator are
/// functions of the type and carried along for convenience.
#[derive(Clone, Copy)]
pub struct ItemType {
    type_id: TypeId,
    type_name: &'static str,
    kind: ItemKind,
    comparator: Option<ItemComparator>,
}

impl ItemType {
    pub fn of<T: BuildItem>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: T::KIND,
            comparator: T::comparator(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn comparator(&self) -> Option<ItemComparator> {
        self.comparator
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        match base.rfind("::") {
            Some(pos) => &self.type_name[pos + 2..],
            None => self.type_name,
        }
    }
}

impl PartialEq for ItemType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ItemType {}

impl Hash for ItemType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemType")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("ordered", &self.comparator.is_some())
            .finish()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    struct Rank(u8);

    impl BuildItem for Rank {
        const KIND: ItemKind = ItemKind::Multi;

        fn comparator() -> Option<ItemComparator> {
            Some(natural_order::<Self>)
        }
    }

    struct Plain;

    impl BuildItem for Plain {
        const KIND: ItemKind = ItemKind::Simple;
    }

    #[test]
    fn test_kind_flags() {
        assert!(ItemKind::Multi.is_multi());
        assert!(ItemKind::NamedMulti.is_multi());
        assert!(!ItemKind::Simple.is_multi());
        assert!(ItemKind::NamedSimple.is_named());
        assert!(!ItemKind::Multi.is_named());
    }

    #[test]
    fn test_item_type_identity() {
        assert_eq!(ItemType::of::<Rank>(), ItemType::of::<Rank>());
        assert_ne!(ItemType::of::<Rank>(), ItemType::of::<Plain>());
        assert_eq!(ItemType::of::<Plain>().short_name(), "Plain");
    }

    #[test]
    fn test_natural_order_compares_values() {
        let compare = ItemType::of::<Rank>().comparator().unwrap();
        assert_eq!(compare(&Rank(1), &Rank(2)), Ordering::Less);
        assert_eq!(compare(&Rank(3), &Rank(2)), Ordering::Greater);
        // mismatched types compare equal
        assert_eq!(compare(&Rank(3), &Plain), Ordering::Equal);
        assert!(ItemType::of::<Plain>().comparator().is_none());
    }
}
