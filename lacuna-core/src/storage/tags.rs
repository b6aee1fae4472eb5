//! One-byte discriminants and the per-collection discriminant table.
//!
//! Tag `0` is always Missing. Tags `1..=k` name the alternatives of the
//! collection's closed kind set, in declaration order. The table is built
//! once at construction and never changes, so dispatch on a tag is a single
//! indexed load.

use crate::error::{LacunaError, Result};
use crate::types::ElementKind;

pub const MISSING_TAG: u8 = 0;

/// The single "value present" discriminant of a binary Value/Missing layout.
pub const VALUE_TAG: u8 = 1;

// Every alternative set fits a one-byte tag: at most one tag per kind plus Missing.
const _: () = assert!(ElementKind::ALL.len() < u8::MAX as usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    kinds: Vec<ElementKind>,
}

impl TagTable {
    /// Builds the table for an alternative set. Duplicates are dropped,
    /// keeping first-declaration order.
    pub fn new(alternatives: &[ElementKind]) -> Self {
        let mut kinds: Vec<ElementKind> = Vec::with_capacity(alternatives.len());
        for &kind in alternatives {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self { kinds }
    }

    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: ElementKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// The kind a tag stands for; `None` for the Missing tag.
    #[inline]
    pub fn kind_of(&self, tag: u8) -> Result<Option<ElementKind>> {
        if tag == MISSING_TAG {
            return Ok(None);
        }
        self.kinds
            .get(tag as usize - 1)
            .copied()
            .map(Some)
            .ok_or_else(|| LacunaError::InternalError(format!("unregistered tag {}", tag)))
    }

    /// The tag registered for `kind`, if it is in the set.
    #[inline]
    pub fn tag_of(&self, kind: ElementKind) -> Option<u8> {
        self.kinds
            .iter()
            .position(|&k| k == kind)
            .map(|pos| (pos + 1) as u8)
    }

    /// Inline value width: the widest bits alternative (0 for an empty set).
    pub fn slot_width(&self) -> usize {
        self.kinds
            .iter()
            .filter_map(|k| k.size_of())
            .max()
            .unwrap_or(0)
    }

    pub fn all_bits(&self) -> bool {
        self.kinds.iter().all(ElementKind::is_bits)
    }

    /// Human-readable form of the alternative set, e.g. `Union{Int64, Missing}`.
    pub fn describe(&self, missing_capable: bool) -> String {
        let mut names: Vec<String> = self.kinds.iter().map(|k| k.to_string()).collect();
        if missing_capable {
            names.push("Missing".to_string());
        }
        format!("Union{{{}}}", names.join(", "))
    }
}
