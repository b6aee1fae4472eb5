//! The general dual-array layout for a small closed set of bits kinds.
//!
//! Each slot owns `width` bytes of the values buffer, where `width` is the
//! widest alternative, plus one tag byte naming which alternative (or
//! Missing) occupies it. The tag→kind mapping is the collection's
//! [`TagTable`], resolved once at construction.
//!
//! Narrowing a single-kind array drops the tag buffer entirely: every slot
//! then holds the one kind, so the values buffer alone describes the array.

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::tags::{TagTable, MISSING_TAG, VALUE_TAG};
use crate::storage::Footprint;
use crate::types::{ElementKind, Scalar, Value};

#[derive(Debug, Clone)]
pub struct UnionArray {
    table: TagTable,
    width: usize,
    missing_capable: bool,
    len: usize,
    values: Vec<u8>,
    // Empty when the array is plain.
    tags: Vec<u8>,
}

impl UnionArray {
    /// Creates `len` slots over the alternative set, each in the `fill` state.
    pub fn new(alternatives: &[ElementKind], len: usize, fill: &Value) -> Result<Self> {
        let table = TagTable::new(alternatives);
        if let Some(kind) = table.kinds().iter().find(|k| !k.is_bits()) {
            return Err(LacunaError::type_mismatch(
                "UnionArray::new",
                "bits kinds only",
                kind.to_string(),
            ));
        }
        let width = table.slot_width();
        let mut out = Self {
            table,
            width,
            missing_capable: true,
            len,
            values: vec![0; len * width],
            tags: vec![MISSING_TAG; len],
        };
        if fill.is_value() {
            for i in 0..len {
                out.write(i, fill)?;
            }
        }
        Ok(out)
    }

    pub fn from_values<I>(alternatives: &[ElementKind], values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut out = Self::new(alternatives, 0, &Slot::Missing)?;
        for v in values {
            out.push(v)?;
        }
        Ok(out)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` for a narrowed single-kind array, which stores no tags.
    #[inline]
    pub fn is_plain(&self) -> bool {
        !self.missing_capable && self.table.kinds().len() == 1
    }

    pub fn table(&self) -> &TagTable {
        &self.table
    }

    pub fn kinds(&self) -> &[ElementKind] {
        self.table.kinds()
    }

    /// `false` only for arrays produced by [`narrow`](Self::narrow).
    pub fn missing_capable(&self) -> bool {
        self.missing_capable
    }

    pub fn describe(&self) -> String {
        self.table.describe(self.missing_capable)
    }

    //==============================================================================
    // Slot access
    //==============================================================================

    pub fn get(&self, i: usize) -> Result<Value> {
        if i >= self.len {
            return Err(LacunaError::out_of_range("UnionArray::get", i, self.len));
        }
        self.decode(i, self.tag_at(i))
    }

    pub fn set(&mut self, i: usize, value: Value) -> Result<()> {
        if i >= self.len() {
            return Err(LacunaError::out_of_range("UnionArray::set", i, self.len()));
        }
        self.write(i, &value)
    }

    pub fn push(&mut self, value: Value) -> Result<()> {
        // Validate before growing so a rejected value leaves no half-pushed slot.
        self.check(&value, "UnionArray::push")?;
        let i = self.len();
        self.values.resize((i + 1) * self.width, 0);
        if !self.is_plain() {
            self.tags.push(MISSING_TAG);
        }
        self.len += 1;
        self.write(i, &value)
    }

    pub fn resize(&mut self, new_len: usize, fill: &Value) -> Result<()> {
        let old_len = self.len;
        // Only new slots take the fill.
        if new_len > old_len {
            self.check(fill, "UnionArray::resize")?;
        }
        log::trace!("UnionArray::resize {} -> {}", old_len, new_len);
        self.values.resize(new_len * self.width, 0);
        if !self.is_plain() {
            self.tags.resize(new_len, MISSING_TAG);
        }
        self.len = new_len;
        if fill.is_value() {
            for i in old_len..new_len {
                self.write(i, fill)?;
            }
        }
        Ok(())
    }

    pub fn missing_count(&self) -> usize {
        // A plain array has no tags and no Missing.
        self.tags.iter().filter(|&&t| t == MISSING_TAG).count()
    }

    /// A copy with Missing removed from the alternative set, if no slot is
    /// currently missing. Later writes of Missing to the copy are rejected.
    /// A single-kind copy is plain: values only, no tag buffer.
    pub fn narrow(&self) -> Option<UnionArray> {
        if self.tags.contains(&MISSING_TAG) {
            return None;
        }
        let mut out = UnionArray {
            table: self.table.clone(),
            width: self.width,
            missing_capable: false,
            len: self.len,
            values: self.values.clone(),
            tags: Vec::new(),
        };
        if !out.is_plain() {
            out.tags = self.tags.clone();
        }
        log_metric!("event"="narrow", "kinds"=out.describe(), "plain"=out.is_plain(), "len"=out.len);
        Some(out)
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            len: self.len,
            value_bytes: self.values.len(),
            tag_bytes: self.tags.len(),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Value> + ExactSizeIterator + '_ {
        // Tags are only ever written from the table, so decoding cannot fail.
        (0..self.len).map(move |i| self.decode(i, self.tag_at(i)).unwrap_or(Slot::Missing))
    }

    //==============================================================================
    // Internal encode/decode
    //==============================================================================

    /// Callers bounds-check `i`. The single kind of a plain array is tag 1.
    #[inline]
    fn tag_at(&self, i: usize) -> u8 {
        if self.is_plain() {
            VALUE_TAG
        } else {
            self.tags[i]
        }
    }

    fn decode(&self, i: usize, tag: u8) -> Result<Value> {
        match self.table.kind_of(tag)? {
            None => Ok(Slot::Missing),
            Some(kind) => {
                let start = i * self.width;
                let bytes = &self.values[start..start + self.width];
                Scalar::read_bits(kind, bytes).map(Slot::Value).ok_or_else(|| {
                    LacunaError::InternalError(format!("slot {} cannot hold {}", i, kind))
                })
            }
        }
    }

    /// Resolves the tag a value would be stored under.
    fn check(&self, value: &Value, op: &'static str) -> Result<u8> {
        match value {
            Slot::Missing if self.missing_capable => Ok(MISSING_TAG),
            Slot::Missing => Err(LacunaError::type_mismatch(op, self.describe(), "Missing")),
            Slot::Value(s) => self
                .table
                .tag_of(s.kind())
                .ok_or_else(|| LacunaError::type_mismatch(op, self.describe(), s.kind().to_string())),
        }
    }

    fn write(&mut self, i: usize, value: &Value) -> Result<()> {
        let tag = self.check(value, "UnionArray::set")?;
        if let Slot::Value(s) = value {
            let start = i * self.width;
            let slot = &mut self.values[start..start + self.width];
            s.write_bits(slot).ok_or_else(|| {
                LacunaError::InternalError(format!("{} does not fit a {}-byte slot", s.kind(), slot.len()))
            })?;
        }
        if !self.is_plain() {
            self.tags[i] = tag;
        }
        Ok(())
    }
}
