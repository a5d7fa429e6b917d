//! # Entity Identity
//!
//! Entities are bare integer identifiers. They carry no data of their own and
//! only act as the join key between component arrays and system sets.
//! A destroyed entity's value is recycled by later allocations.

use std::fmt;

/// Unique identifier for a live entity.
///
/// Values are minted sequentially from zero and recycled after destruction,
/// so an `Entity` kept past its destruction may later name a different
/// entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Wraps a raw id.
    ///
    /// Ids are normally handed out by the coordinator; this exists for
    /// storage-level code and tests that address slots directly.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into per-entity tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Entity {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
