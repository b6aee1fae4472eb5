// In: src/storage/column.rs

//! The dynamic collection entry point.
//!
//! A `Column` holds elements drawn from a closed set of `ElementKind`s plus
//! Missing. The storage strategy is picked once, at construction, from that
//! set: all bits kinds → the dual-array `UnionArray`; any reference kind →
//! the pointer-based `RefArray`.

use std::sync::Arc;

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::refs::RefArray;
use crate::storage::tags::TagTable;
use crate::storage::union::UnionArray;
use crate::storage::Footprint;
use crate::types::{ElementKind, Scalar, Value};

/// The per-slot state a new collection starts in.
#[derive(Debug, Clone)]
pub enum InitialState {
    AllMissing,
    AllPresent(Scalar),
    FromSequence(Vec<Value>),
}

#[derive(Debug, Clone)]
pub enum Column {
    Bits(UnionArray),
    Refs(RefColumn),
}

/// Pointer-backed column: the kind check the tag table gives a `UnionArray`
/// is done here against the same kind of table, but nothing is stored per slot.
#[derive(Debug, Clone)]
pub struct RefColumn {
    table: TagTable,
    missing_capable: bool,
    slots: RefArray<Scalar>,
}

//==================================================================================
// 1. Construction
//==================================================================================

/// Builds a collection over `alternatives` with `len` slots.
///
/// # Errors
/// * `LengthMismatch` when a `FromSequence` source does not have `len` items.
/// * `TypeMismatch` when an initial value's kind is outside `alternatives`.
pub fn make_collection(
    alternatives: &[ElementKind],
    len: usize,
    initial: InitialState,
) -> Result<Column> {
    let table = TagTable::new(alternatives);
    let strategy = if table.all_bits() { "dual_array" } else { "pointer" };
    log_metric!("event"="make_collection", "strategy"=strategy, "kinds"=table.describe(true), "len"=len);

    if let InitialState::FromSequence(seq) = &initial {
        if seq.len() != len {
            return Err(LacunaError::length_mismatch("make_collection", len, seq.len()));
        }
    }

    if table.all_bits() {
        let array = match initial {
            InitialState::AllMissing => UnionArray::new(table.kinds(), len, &Slot::Missing)?,
            InitialState::AllPresent(fill) => UnionArray::new(table.kinds(), len, &Slot::Value(fill))?,
            InitialState::FromSequence(seq) => UnionArray::from_values(table.kinds(), seq)?,
        };
        return Ok(Column::Bits(array));
    }

    let mut column = RefColumn {
        table,
        missing_capable: true,
        slots: RefArray::all_missing(0),
    };
    match initial {
        InitialState::AllMissing => column.slots = RefArray::all_missing(len),
        InitialState::AllPresent(fill) => {
            column.check(&Slot::Value(fill.clone()), "make_collection")?;
            column.slots = RefArray::filled(len, Arc::new(fill));
        }
        InitialState::FromSequence(seq) => {
            for v in seq {
                column.push(v)?;
            }
        }
    }
    Ok(Column::Refs(column))
}

impl RefColumn {
    fn check(&self, value: &Value, op: &'static str) -> Result<()> {
        match value {
            Slot::Missing if self.missing_capable => Ok(()),
            Slot::Missing => Err(LacunaError::type_mismatch(
                op,
                self.table.describe(false),
                "Missing",
            )),
            Slot::Value(s) if self.table.contains(s.kind()) => Ok(()),
            Slot::Value(s) => Err(LacunaError::type_mismatch(
                op,
                self.table.describe(self.missing_capable),
                s.kind().to_string(),
            )),
        }
    }

    fn push(&mut self, value: Value) -> Result<()> {
        self.check(&value, "Column::push")?;
        self.slots.push(value.map(Arc::new));
        Ok(())
    }
}

//==================================================================================
// 2. Uniform slot API over both strategies
//==================================================================================

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Bits(a) => a.len(),
            Column::Refs(c) => c.slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when the dual-array strategy was selected.
    pub fn is_bits(&self) -> bool {
        matches!(self, Column::Bits(_))
    }

    pub fn kinds(&self) -> &[ElementKind] {
        match self {
            Column::Bits(a) => a.kinds(),
            Column::Refs(c) => c.table.kinds(),
        }
    }

    pub fn missing_capable(&self) -> bool {
        match self {
            Column::Bits(a) => a.missing_capable(),
            Column::Refs(c) => c.missing_capable,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Column::Bits(a) => a.describe(),
            Column::Refs(c) => c.table.describe(c.missing_capable),
        }
    }

    pub fn get(&self, i: usize) -> Result<Value> {
        match self {
            Column::Bits(a) => a.get(i),
            Column::Refs(c) => Ok(c.slots.get_ref(i)?.map(Scalar::clone)),
        }
    }

    pub fn set(&mut self, i: usize, value: Value) -> Result<()> {
        match self {
            Column::Bits(a) => a.set(i, value),
            Column::Refs(c) => {
                if i >= c.slots.len() {
                    return Err(LacunaError::out_of_range("Column::set", i, c.slots.len()));
                }
                c.check(&value, "Column::set")?;
                c.slots.set(i, value.map(Arc::new))
            }
        }
    }

    pub fn push(&mut self, value: Value) -> Result<()> {
        match self {
            Column::Bits(a) => a.push(value),
            Column::Refs(c) => c.push(value),
        }
    }

    pub fn resize(&mut self, new_len: usize, fill: Value) -> Result<()> {
        match self {
            Column::Bits(a) => a.resize(new_len, &fill),
            Column::Refs(c) => {
                if new_len > c.slots.len() {
                    c.check(&fill, "Column::resize")?;
                }
                c.slots.resize(new_len, fill.map(Arc::new));
                Ok(())
            }
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Bits(a) => a.missing_count(),
            Column::Refs(c) => c.slots.missing_count(),
        }
    }

    pub fn has_missing(&self) -> bool {
        self.missing_count() > 0
    }

    /// Drops Missing from the alternative set when no slot currently holds it.
    pub fn narrow(&self) -> Option<Column> {
        match self {
            Column::Bits(a) => a.narrow().map(Column::Bits),
            Column::Refs(c) => {
                if c.slots.has_missing() {
                    return None;
                }
                let mut out = c.clone();
                out.missing_capable = false;
                Some(Column::Refs(out))
            }
        }
    }

    pub fn footprint(&self) -> Footprint {
        match self {
            Column::Bits(a) => a.footprint(),
            Column::Refs(c) => c.slots.footprint(),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        match self {
            Column::Bits(a) => Box::new(a.iter()),
            Column::Refs(c) => Box::new(c.slots.iter().map(|s| s.map(Scalar::clone))),
        }
    }

    /// Lazily yields only the present scalars, in order.
    pub fn skip_missing(&self) -> impl Iterator<Item = Scalar> + '_ {
        crate::adapter::skip::skip_missing(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| Slot::from(v.map(Scalar::Int64)))
            .collect()
    }

    #[test]
    fn test_strategy_follows_kind_set() {
        let bits = make_collection(&[ElementKind::Int64], 2, InitialState::AllMissing).unwrap();
        assert!(bits.is_bits());
        assert_eq!(bits.footprint().tag_bytes, 2);

        let refs = make_collection(
            &[ElementKind::Utf8, ElementKind::Int64],
            2,
            InitialState::AllMissing,
        )
        .unwrap();
        assert!(!refs.is_bits());
        assert_eq!(refs.footprint().tag_bytes, 0);
    }

    #[test]
    fn test_from_sequence_length_must_match() {
        let result = make_collection(
            &[ElementKind::Int64],
            4,
            InitialState::FromSequence(ints(&[Some(1), None])),
        );
        assert!(matches!(result, Err(LacunaError::LengthMismatch { .. })));
    }

    #[test]
    fn test_all_present_kind_checked() {
        let result = make_collection(
            &[ElementKind::Int64],
            2,
            InitialState::AllPresent(Scalar::Float64(1.0)),
        );
        assert!(matches!(result, Err(LacunaError::TypeMismatch { .. })));

        let result = make_collection(
            &[ElementKind::Utf8],
            2,
            InitialState::AllPresent(Scalar::Int8(1)),
        );
        assert!(matches!(result, Err(LacunaError::TypeMismatch { .. })));
    }

    #[test]
    fn test_set_get_on_pointer_column() {
        let mut col = make_collection(&[ElementKind::Utf8], 3, InitialState::AllMissing).unwrap();
        col.set(2, Slot::Value(Scalar::utf8("z"))).unwrap();
        assert_eq!(col.get(2).unwrap(), Slot::Value(Scalar::utf8("z")));
        assert_eq!(col.get(0).unwrap(), Slot::Missing);
        assert!(matches!(
            col.set(0, Slot::Value(Scalar::Int32(1))),
            Err(LacunaError::TypeMismatch { .. })
        ));
        assert!(matches!(
            col.set(3, Slot::Missing),
            Err(LacunaError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_narrow_both_strategies() {
        let full = make_collection(
            &[ElementKind::Int64],
            2,
            InitialState::FromSequence(ints(&[Some(1), Some(2)])),
        )
        .unwrap();
        let narrowed = full.narrow().unwrap();
        assert!(!narrowed.missing_capable());
        assert_eq!(narrowed.footprint().tag_bytes, 0);
        assert_eq!(narrowed.footprint().value_bytes, 16);
        assert_eq!(narrowed.get(1).unwrap(), Slot::Value(Scalar::Int64(2)));

        let mut words = make_collection(
            &[ElementKind::Utf8],
            1,
            InitialState::AllPresent(Scalar::utf8("a")),
        )
        .unwrap();
        assert!(words.narrow().is_some());
        words.set(0, Slot::Missing).unwrap();
        assert!(words.narrow().is_none());
    }

    #[test]
    fn test_shrinking_narrowed_column_with_missing_fill() {
        let full = make_collection(
            &[ElementKind::Int64],
            4,
            InitialState::AllPresent(Scalar::Int64(1)),
        )
        .unwrap();
        let mut narrowed = full.narrow().unwrap();
        narrowed.resize(2, Slot::Missing).unwrap();
        assert_eq!(narrowed.len(), 2);

        let words = make_collection(
            &[ElementKind::Utf8],
            3,
            InitialState::AllPresent(Scalar::utf8("a")),
        )
        .unwrap();
        let mut narrowed = words.narrow().unwrap();
        narrowed.resize(1, Slot::Missing).unwrap();
        assert_eq!(narrowed.len(), 1);
        assert!(matches!(
            narrowed.resize(2, Slot::Missing),
            Err(LacunaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_skip_missing_over_column() {
        let col = make_collection(
            &[ElementKind::Int64],
            3,
            InitialState::FromSequence(ints(&[Some(1), None, Some(2)])),
        )
        .unwrap();
        let present: Vec<Scalar> = col.skip_missing().collect();
        assert_eq!(present, vec![Scalar::Int64(1), Scalar::Int64(2)]);
    }
}
