// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed identifiers for the values that flow between build steps.
//!
//! Every value produced or consumed in a chain is keyed by an [`ItemId`]: the
//! Rust type of the value (captured as an [`ItemType`]) plus an optional name.
//! The engine never inspects payloads; it only needs identity and
//! multiplicity, both of which come from the [`BuildItem`] implementation.
//!
//! # Example
//! ```
//! use buildchain::item::{BuildItem, ItemId, ItemKind};
//!
//! struct Config(String);
//! impl BuildItem for Config {
//!     const KIND: ItemKind = ItemKind::Simple;
//! }
//!
//! let id = ItemId::of::<Config>().unwrap();
//! assert!(!id.is_multi());
//! ```

mod id;
mod kind;

pub use id::ItemId;
pub use kind::{natural_order, BuildItem, ItemComparator, ItemKind, ItemType};

use std::any::Any;
use std::sync::Arc;

/// Type-erased handle to a produced value.
pub(crate) type ItemValue = Arc<dyn Any + Send + Sync>;
