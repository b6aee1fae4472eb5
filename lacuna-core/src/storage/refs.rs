//! The pointer-based fallback for variable-size or reference element types.
//!
//! Each slot is an `Option<Arc<T>>`. `None` is the null pointer niche, so
//! the missing marker costs nothing beyond the reference itself and no tag
//! buffer exists. Referents are shared; their lifetime is independent of the
//! collection.

use std::sync::Arc;

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::Footprint;

#[derive(Debug)]
pub struct RefArray<T: ?Sized> {
    slots: Vec<Option<Arc<T>>>,
}

// Manual impl: cloning only bumps reference counts, so `T: Clone` is not needed.
impl<T: ?Sized> Clone for RefArray<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<T: ?Sized> RefArray<T> {
    pub fn all_missing(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// `len` slots all sharing one referent.
    pub fn filled(len: usize, value: Arc<T>) -> Self {
        Self {
            slots: vec![Some(value); len],
        }
    }

    pub fn from_slots<I: IntoIterator<Item = Slot<Arc<T>>>>(slots: I) -> Self {
        Self {
            slots: slots.into_iter().map(Slot::into_option).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Shared handle to slot `i`'s referent.
    pub fn get(&self, i: usize) -> Result<Slot<Arc<T>>> {
        self.slots
            .get(i)
            .map(|s| Slot::from(s.clone()))
            .ok_or_else(|| LacunaError::out_of_range("RefArray::get", i, self.len()))
    }

    pub fn get_ref(&self, i: usize) -> Result<Slot<&T>> {
        self.slots
            .get(i)
            .map(|s| Slot::from(s.as_deref()))
            .ok_or_else(|| LacunaError::out_of_range("RefArray::get", i, self.len()))
    }

    pub fn set(&mut self, i: usize, value: Slot<Arc<T>>) -> Result<()> {
        let len = self.len();
        let slot = self
            .slots
            .get_mut(i)
            .ok_or_else(|| LacunaError::out_of_range("RefArray::set", i, len))?;
        *slot = value.into_option();
        Ok(())
    }

    pub fn push(&mut self, value: Slot<Arc<T>>) {
        self.slots.push(value.into_option());
    }

    pub fn resize(&mut self, new_len: usize, fill: Slot<Arc<T>>) {
        log::trace!("RefArray::resize {} -> {}", self.len(), new_len);
        self.slots.resize(new_len, fill.into_option());
    }

    pub fn missing_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn has_missing(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// No tag bytes: the reference is the whole slot.
    pub fn footprint(&self) -> Footprint {
        Footprint {
            len: self.len(),
            value_bytes: self.slots.len() * std::mem::size_of::<Option<Arc<T>>>(),
            tag_bytes: 0,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Slot<&T>> + ExactSizeIterator + '_ {
        self.slots.iter().map(|s| Slot::from(s.as_deref()))
    }
}
