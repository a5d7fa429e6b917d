//! # Component Signatures
//!
//! A signature is a fixed-width bitset with one bit per registered component
//! type. Entities own one describing what they hold; systems own one
//! describing what they require.
//!
//! ```text
//! entity:   0b1011
//! required: 0b0011   (entity & required) == required  -> match
//! required: 0b0110   (entity & required) != required  -> no match
//! ```

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Small integer identifying a registered component type.
///
/// Doubles as the bit index inside a [`Signature`].
pub type ComponentTypeId = u16;

/// Maximum number of component types a signature can describe.
pub const MAX_COMPONENT_TYPES: usize = 256;

/// Number of `u64` words backing a signature.
const SIGNATURE_WORDS: usize = (MAX_COMPONENT_TYPES + 63) / 64;

/// Bitset of component type ids.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    words: [u64; SIGNATURE_WORDS],
}

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self {
        words: [0; SIGNATURE_WORDS],
    };

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Builds a signature with exactly the given bits set.
    ///
    /// # Panics
    ///
    /// Panics if an id is not below [`MAX_COMPONENT_TYPES`].
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ComponentTypeId>) -> Self {
        let mut signature = Self::new();
        for id in ids {
            signature.set(id);
        }
        signature
    }

    /// Returns a copy with `id` set.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENT_TYPES`].
    #[inline]
    #[must_use]
    pub fn with(mut self, id: ComponentTypeId) -> Self {
        self.set(id);
        self
    }

    /// Sets the bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENT_TYPES`].
    #[inline]
    pub fn set(&mut self, id: ComponentTypeId) {
        let (word, bit) = Self::locate(id);
        self.words[word] |= 1u64 << bit;
    }

    /// Clears the bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below [`MAX_COMPONENT_TYPES`].
    #[inline]
    pub fn clear(&mut self, id: ComponentTypeId) {
        let (word, bit) = Self::locate(id);
        self.words[word] &= !(1u64 << bit);
    }

    /// Returns `true` if the bit for `id` is set. Out-of-range ids are never set.
    #[inline]
    #[must_use]
    pub fn has(&self, id: ComponentTypeId) -> bool {
        let index = usize::from(id);
        if index >= MAX_COMPONENT_TYPES {
            return false;
        }
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Returns `true` if every bit of `required` is also set here.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, required: &Self) -> bool {
        self.words
            .iter()
            .zip(required.words.iter())
            .all(|(have, need)| have & need == *need)
    }

    /// Resets every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.words = [0; SIGNATURE_WORDS];
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over set ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let base = word_index * 64;
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let tz = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    ComponentTypeId::try_from(base + tz).ok()
                })
            })
    }

    #[inline]
    fn locate(id: ComponentTypeId) -> (usize, usize) {
        let index = usize::from(id);
        assert!(
            index < MAX_COMPONENT_TYPES,
            "component type id {index} exceeds signature width {MAX_COMPONENT_TYPES}"
        );
        (index / 64, index % 64)
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl BitAndAssign for Signature {
    fn bitand_assign(&mut self, rhs: Self) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a &= b;
        }
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Self) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a |= b;
        }
    }
}

impl FromIterator<ComponentTypeId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// Binary, most significant set bit first: `0b11` for ids {0, 1}.
impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(top) = self.words.iter().rposition(|w| *w != 0) else {
            return f.write_str("0b0");
        };
        write!(f, "0b{:b}", self.words[top])?;
        for word in self.words[..top].iter().rev() {
            write!(f, "{word:064b}")?;
        }
        Ok(())
    }
}
