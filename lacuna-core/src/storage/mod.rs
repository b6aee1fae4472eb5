//! This module serves as the public API for every storage strategy a
//! missing-capable collection can use.
//!
//! The core principle is to keep a value and its presence information apart:
//! bits element types live in a values buffer next to a one-byte tag buffer
//! (`dual`, `union`), reference element types live behind nullable shared
//! pointers (`refs`). `column` picks between them from the element kinds a
//! collection can hold.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod column;
pub mod dual;
pub mod refs;
pub mod tags;
pub mod union;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use column::{make_collection, Column, InitialState};
pub use dual::DualArray;
pub use refs::RefArray;
pub use tags::TagTable;
pub use union::UnionArray;

//==================================================================================
// 3. Memory accounting
//==================================================================================

/// Byte breakdown of a collection's buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub len: usize,
    pub value_bytes: usize,
    pub tag_bytes: usize,
}

impl Footprint {
    pub fn total(&self) -> usize {
        self.value_bytes + self.tag_bytes
    }

    /// Tag bytes relative to value bytes. `1 / size_of::<T>()` for a
    /// dual array, `0.0` for pointer storage.
    pub fn overhead_ratio(&self) -> f64 {
        if self.value_bytes == 0 {
            return 0.0;
        }
        self.tag_bytes as f64 / self.value_bytes as f64
    }
}

//==================================================================================
// 4. Unit Tests (Module-level)
//==================================================================================

#[cfg(test)]
mod dual_tests;
