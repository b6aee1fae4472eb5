//! The binary dual-array layout: a values buffer of `T` plus a parallel
//! one-byte tag buffer.
//!
//! Layout invariants:
//! 1. `values.len() == tags.len()` at all times.
//! 2. A slot tagged `MISSING_TAG` has unspecified content in `values`; it is
//!    never read as a `T`.
//! 3. Every mutation goes through `&mut self`, so a reader never observes a
//!    tag and a value from different writes.
//!
//! For an N-element array the footprint is `N * size_of::<T>() + N` bytes.

use std::iter::FusedIterator;

use crate::adapter::skip::SkipMissing;
use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::tags::{MISSING_TAG, VALUE_TAG};
use crate::storage::Footprint;
use crate::traits::Bits;

#[derive(Debug, Clone)]
pub struct DualArray<T: Bits> {
    values: Vec<T>,
    tags: Vec<u8>,
}

impl<T: Bits> DualArray<T> {
    //==============================================================================
    // 1. Construction
    //==============================================================================

    /// Creates `len` slots, each in the `fill` state.
    pub fn new(len: usize, fill: Slot<T>) -> Self {
        match fill {
            Slot::Value(v) => Self {
                values: vec![v; len],
                tags: vec![VALUE_TAG; len],
            },
            Slot::Missing => Self::all_missing(len),
        }
    }

    pub fn all_missing(len: usize) -> Self {
        Self {
            values: vec![T::zeroed(); len],
            tags: vec![MISSING_TAG; len],
        }
    }

    /// Wraps a plain vector as an all-present array. The vector becomes the
    /// values buffer as-is.
    pub fn from_values(values: Vec<T>) -> Self {
        let tags = vec![VALUE_TAG; values.len()];
        Self { values, tags }
    }

    pub fn from_slots<I: IntoIterator<Item = Slot<T>>>(slots: I) -> Self {
        let iter = slots.into_iter();
        let (lower, _) = iter.size_hint();
        let mut out = Self::with_capacity(lower);
        for slot in iter {
            out.push(slot);
        }
        out
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            tags: Vec::with_capacity(capacity),
        }
    }

    //==============================================================================
    // 2. Slot access
    //==============================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Reads slot `i`. The value buffer is only touched for present slots.
    #[inline]
    pub fn get(&self, i: usize) -> Result<Slot<T>> {
        match self.tags.get(i) {
            Some(&MISSING_TAG) => Ok(Slot::Missing),
            Some(_) => Ok(Slot::Value(self.values[i])),
            None => Err(LacunaError::out_of_range("DualArray::get", i, self.len())),
        }
    }

    /// Writes slot `i`. Writing `Missing` only touches the tag; the old value
    /// bits stay behind as garbage.
    #[inline]
    pub fn set(&mut self, i: usize, slot: Slot<T>) -> Result<()> {
        let len = self.len();
        let tag = self
            .tags
            .get_mut(i)
            .ok_or_else(|| LacunaError::out_of_range("DualArray::set", i, len))?;
        match slot {
            Slot::Value(v) => {
                self.values[i] = v;
                *tag = VALUE_TAG;
            }
            Slot::Missing => *tag = MISSING_TAG,
        }
        Ok(())
    }

    pub fn is_missing(&self, i: usize) -> Result<bool> {
        self.tags
            .get(i)
            .map(|&t| t == MISSING_TAG)
            .ok_or_else(|| LacunaError::out_of_range("DualArray::is_missing", i, self.len()))
    }

    /// Slot `i` without bounds reporting; used by iterators that already
    /// own the bounds.
    #[inline]
    fn slot_at(&self, i: usize) -> Slot<T> {
        if self.tags[i] == MISSING_TAG {
            Slot::Missing
        } else {
            Slot::Value(self.values[i])
        }
    }

    //==============================================================================
    // 3. Growth and shrinkage (both buffers move together)
    //==============================================================================

    pub fn push(&mut self, slot: Slot<T>) {
        match slot {
            Slot::Value(v) => {
                self.values.push(v);
                self.tags.push(VALUE_TAG);
            }
            Slot::Missing => {
                self.values.push(T::zeroed());
                self.tags.push(MISSING_TAG);
            }
        }
    }

    /// Resizes to `new_len`. Existing slot pairs keep their state; new slots
    /// take the `fill` state.
    pub fn resize(&mut self, new_len: usize, fill: Slot<T>) {
        log::trace!("DualArray::resize {} -> {}", self.len(), new_len);
        let (value, tag) = match fill {
            Slot::Value(v) => (v, VALUE_TAG),
            Slot::Missing => (T::zeroed(), MISSING_TAG),
        };
        self.values.resize(new_len, value);
        self.tags.resize(new_len, tag);
    }

    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
        self.tags.truncate(len);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.tags.clear();
    }

    //==============================================================================
    // 4. Inspection and narrowing
    //==============================================================================

    pub fn missing_count(&self) -> usize {
        self.tags.iter().filter(|&&t| t == MISSING_TAG).count()
    }

    pub fn has_missing(&self) -> bool {
        self.tags.contains(&MISSING_TAG)
    }

    /// Copies out a plain values buffer if, and only if, no slot is currently
    /// missing. This inspects the tags; an array that *could* hold missing but
    /// currently holds none narrows successfully.
    pub fn narrow(&self) -> Option<Vec<T>> {
        if self.has_missing() {
            return None;
        }
        Some(self.values.clone())
    }

    /// Consuming form of [`narrow`](Self::narrow): hands back the values
    /// buffer without copying, or the array itself when it holds missing.
    pub fn into_narrow(self) -> std::result::Result<Vec<T>, Self> {
        if self.has_missing() {
            Err(self)
        } else {
            Ok(self.values)
        }
    }

    /// Splits the array into its values and tag buffers. Values under a
    /// `MISSING_TAG` are unspecified.
    pub fn into_parts(self) -> (Vec<T>, Vec<u8>) {
        (self.values, self.tags)
    }

    /// Reassembles an array from buffers produced by [`into_parts`](Self::into_parts)
    /// or an equivalent external layout.
    ///
    /// # Errors
    /// `LengthMismatch` for buffers of different length; `InternalError` for a
    /// tag other than `MISSING_TAG`/`VALUE_TAG`.
    pub fn from_parts(values: Vec<T>, tags: Vec<u8>) -> Result<Self> {
        if values.len() != tags.len() {
            return Err(LacunaError::length_mismatch(
                "DualArray::from_parts",
                values.len(),
                tags.len(),
            ));
        }
        if let Some(bad) = tags.iter().find(|&&t| t != MISSING_TAG && t != VALUE_TAG) {
            return Err(LacunaError::InternalError(format!(
                "tag {} is not valid for a binary dual array",
                bad
            )));
        }
        Ok(Self { values, tags })
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            len: self.len(),
            value_bytes: self.values.len() * std::mem::size_of::<T>(),
            tag_bytes: self.tags.len(),
        }
    }

    /// The raw tag buffer, one discriminant per slot.
    pub fn tags(&self) -> &[u8] {
        &self.tags
    }

    //==============================================================================
    // 5. Iteration
    //==============================================================================

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            array: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Lazily yields only the present values, in order.
    pub fn skip_missing(&self) -> SkipMissing<Iter<'_, T>> {
        crate::adapter::skip::skip_missing(self)
    }
}

impl<T: Bits + bytemuck::Pod> DualArray<T> {
    /// Raw view of the values buffer, missing slots included.
    pub fn values_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }
}

impl<T: Bits + PartialEq> PartialEq for DualArray<T> {
    /// Structural equality: same length, same tags, equal values where present.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Bits> FromIterator<Slot<T>> for DualArray<T> {
    fn from_iter<I: IntoIterator<Item = Slot<T>>>(iter: I) -> Self {
        Self::from_slots(iter)
    }
}

impl<T: Bits> FromIterator<Option<T>> for DualArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self::from_slots(iter.into_iter().map(Slot::from))
    }
}

impl<T: Bits> Extend<Slot<T>> for DualArray<T> {
    fn extend<I: IntoIterator<Item = Slot<T>>>(&mut self, iter: I) {
        for slot in iter {
            self.push(slot);
        }
    }
}

impl<'a, T: Bits> IntoIterator for &'a DualArray<T> {
    type Item = Slot<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//==================================================================================
// 6. Slot iterator
//==================================================================================

/// Yields every slot of a `DualArray` as a `Slot<T>`.
#[derive(Debug, Clone)]
pub struct Iter<'a, T: Bits> {
    array: &'a DualArray<T>,
    front: usize,
    back: usize,
}

impl<T: Bits> Iterator for Iter<'_, T> {
    type Item = Slot<T>;

    #[inline]
    fn next(&mut self) -> Option<Slot<T>> {
        if self.front == self.back {
            return None;
        }
        let slot = self.array.slot_at(self.front);
        self.front += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T: Bits> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Slot<T>> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.array.slot_at(self.back))
    }
}

impl<T: Bits> ExactSizeIterator for Iter<'_, T> {}

impl<T: Bits> FusedIterator for Iter<'_, T> {}
