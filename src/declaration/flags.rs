// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::marker::PhantomData;

/// A single modifier that can appear in a [`Flags`] set.
pub trait Flag: Copy + fmt::Debug + 'static {
    /// Every variant, in bit order.
    const ALL: &'static [Self];

    fn bit(self) -> u32;
}

/// Modifiers on a consume declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumeFlag {
    /// The step runs even if nothing produced the item.
    Optional,
}

impl Flag for ConsumeFlag {
    const ALL: &'static [Self] = &[ConsumeFlag::Optional];

    fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Modifiers on a produce declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProduceFlag {
    /// Producing the item does not pull the step into the chain.
    Weak,
    /// The producer yields to any non-overridable producer of the same item.
    Overridable,
}

impl Flag for ProduceFlag {
    const ALL: &'static [Self] = &[ProduceFlag::Weak, ProduceFlag::Overridable];

    fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Immutable bitset over one flag enum.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags<F: Flag> {
    bits: u32,
    _flag: PhantomData<F>,
}

pub type ConsumeFlags = Flags<ConsumeFlag>;
pub type ProduceFlags = Flags<ProduceFlag>;

impl<F: Flag> Flags<F> {
    pub const fn none() -> Self {
        Self {
            bits: 0,
            _flag: PhantomData,
        }
    }

    pub fn of(flag: F) -> Self {
        Self::none().with(flag)
    }

    pub fn with(self, flag: F) -> Self {
        Self {
            bits: self.bits | flag.bit(),
            _flag: PhantomData,
        }
    }

    pub fn without(self, flag: F) -> Self {
        Self {
            bits: self.bits & !flag.bit(),
            _flag: PhantomData,
        }
    }

    pub fn contains(self, flag: F) -> bool {
        self.bits & flag.bit() != 0
    }

    pub fn contains_all(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
            _flag: PhantomData,
        }
    }

    pub fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
            _flag: PhantomData,
        }
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl<F: Flag> Default for Flags<F> {
    fn default() -> Self {
        Self::none()
    }
}

impl<F: Flag> From<F> for Flags<F> {
    fn from(flag: F) -> Self {
        Self::of(flag)
    }
}

impl<F: Flag> fmt::Debug for Flags<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(F::ALL.iter().filter(|flag| self.contains(**flag)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let flags = ProduceFlags::none();
        assert!(flags.is_empty());
        assert!(!flags.contains(ProduceFlag::Weak));
        assert_eq!(flags, ProduceFlags::default());
    }

    #[test]
    fn test_with_and_without() {
        let flags = ProduceFlags::of(ProduceFlag::Weak).with(ProduceFlag::Overridable);
        assert!(flags.contains(ProduceFlag::Weak));
        assert!(flags.contains(ProduceFlag::Overridable));

        let flags = flags.without(ProduceFlag::Weak);
        assert!(!flags.contains(ProduceFlag::Weak));
        assert!(flags.contains(ProduceFlag::Overridable));
    }

    #[test]
    fn test_contains_all() {
        let both = ProduceFlags::of(ProduceFlag::Weak).with(ProduceFlag::Overridable);
        let weak = ProduceFlags::of(ProduceFlag::Weak);
        assert!(both.contains_all(weak));
        assert!(!weak.contains_all(both));
        assert!(weak.contains_all(ProduceFlags::none()));
    }

    #[test]
    fn test_set_operations() {
        let weak = ProduceFlags::of(ProduceFlag::Weak);
        let overridable = ProduceFlags::of(ProduceFlag::Overridable);
        assert_eq!(weak.union(overridable), weak.with(ProduceFlag::Overridable));
        assert!(weak.intersection(overridable).is_empty());
    }

    #[test]
    fn test_debug_lists_flags() {
        let flags = ConsumeFlags::of(ConsumeFlag::Optional);
        assert_eq!(format!("{:?}", flags), "{Optional}");
    }
}
