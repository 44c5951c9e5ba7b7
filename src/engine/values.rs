// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Helpers shared by the run state and the result for type-erased values.

use std::any::Any;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::ContextError;
use crate::item::{ItemComparator, ItemId, ItemValue};

/// Appends `value`, or inserts it after every value that does not sort
/// after it when the item type has a comparator.
pub(crate) fn insert_value(list: &mut Vec<ItemValue>, value: ItemValue, comparator: Option<ItemComparator>) {
    match comparator {
        Some(compare) => {
            let position = list.partition_point(|existing| {
                compare(erase(existing), erase(&value)) != Ordering::Greater
            });
            list.insert(position, value);
        }
        None => list.push(value),
    }
}

pub(crate) fn downcast<T: Any + Send + Sync>(id: &ItemId, value: ItemValue) -> Result<Arc<T>, ContextError> {
    value.downcast::<T>().map_err(|_| ContextError::TypeMismatch {
        item: id.clone(),
        expected: std::any::type_name::<T>(),
    })
}

pub(crate) fn downcast_all<T: Any + Send + Sync>(
    id: &ItemId,
    values: Vec<ItemValue>,
) -> Result<Vec<Arc<T>>, ContextError> {
    values.into_iter().map(|value| downcast(id, value)).collect()
}

/// Locks `mutex`, recovering the data if a step panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn erase(value: &ItemValue) -> &dyn Any {
    &**value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::natural_order;

    fn values(list: &[ItemValue]) -> Vec<u32> {
        list.iter()
            .map(|value| *value.downcast_ref::<u32>().unwrap())
            .collect()
    }

    #[test]
    fn test_insert_without_comparator_appends() {
        let mut list: Vec<ItemValue> = Vec::new();
        for value in [3u32, 1, 2] {
            insert_value(&mut list, Arc::new(value), None);
        }
        assert_eq!(values(&list), vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_with_comparator_sorts() {
        let mut list: Vec<ItemValue> = Vec::new();
        for value in [5u32, 1, 4, 1, 3] {
            insert_value(&mut list, Arc::new(value), Some(natural_order::<u32>));
        }
        assert_eq!(values(&list), vec![1, 1, 3, 4, 5]);
    }

    #[test]
    fn test_downcast_mismatch() {
        struct Marker;
        impl crate::item::BuildItem for Marker {
            const KIND: crate::item::ItemKind = crate::item::ItemKind::Simple;
        }

        let id = ItemId::of::<Marker>().unwrap();
        let value: ItemValue = Arc::new(7u32);
        let result = downcast::<String>(&id, value);
        assert!(matches!(result, Err(ContextError::TypeMismatch { .. })));
    }
}
