// In: src/bridge/arrow_impl.rs

//! Conversions between lacuna collections and Arrow arrays.
//!
//! The dual-array layout and Arrow's layout differ only in how presence is
//! recorded: a byte tag per slot here, a validity bit per slot there. The
//! values buffer moves across unchanged, including the unspecified bits under
//! missing/null slots, which neither side ever reads.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, BooleanBuilder, PrimitiveArray, PrimitiveBuilder,
    StringBuilder,
};
use arrow::buffer::{NullBuffer, ScalarBuffer};
use arrow::datatypes::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::tags::{MISSING_TAG, VALUE_TAG};
use crate::storage::{make_collection, Column, DualArray, InitialState};
use crate::traits::Bits;
use crate::types::{ElementKind, Scalar, Value};

//==================================================================================
// 1. Typed path: DualArray <-> PrimitiveArray / BooleanArray
//==================================================================================

/// Moves a dual array into an Arrow primitive array. Missing slots become
/// nulls; an array with no missing slot gets no validity buffer at all.
pub fn into_arrow<A>(array: DualArray<A::Native>) -> Result<PrimitiveArray<A>>
where
    A: ArrowPrimitiveType,
    A::Native: Bits,
{
    let has_missing = array.has_missing();
    let (values, tags) = array.into_parts();
    let nulls = has_missing.then(|| {
        NullBuffer::from(tags.iter().map(|&t| t != MISSING_TAG).collect::<Vec<bool>>())
    });
    Ok(PrimitiveArray::<A>::try_new(ScalarBuffer::from(values), nulls)?)
}

pub fn to_arrow<A>(array: &DualArray<A::Native>) -> Result<PrimitiveArray<A>>
where
    A: ArrowPrimitiveType,
    A::Native: Bits,
{
    into_arrow(array.clone())
}

/// Copies an Arrow primitive array into a dual array. Nulls become Missing.
pub fn from_arrow<A>(array: &PrimitiveArray<A>) -> Result<DualArray<A::Native>>
where
    A: ArrowPrimitiveType,
    A::Native: Bits,
{
    let values: Vec<A::Native> = array.values().to_vec();
    let tags: Vec<u8> = match array.nulls() {
        Some(nulls) => nulls
            .iter()
            .map(|valid| if valid { VALUE_TAG } else { MISSING_TAG })
            .collect(),
        None => vec![VALUE_TAG; values.len()],
    };
    DualArray::from_parts(values, tags)
}

pub fn bool_to_arrow(array: &DualArray<bool>) -> BooleanArray {
    array.iter().map(Option::from).collect::<Vec<Option<bool>>>().into()
}

pub fn bool_from_arrow(array: &BooleanArray) -> DualArray<bool> {
    array.iter().collect()
}

//==================================================================================
// 2. Dynamic path: Column <-> ArrayRef
//==================================================================================

fn unexpected(op: &'static str, expected: ElementKind, found: &Scalar) -> LacunaError {
    LacunaError::type_mismatch(op, expected.to_string(), found.kind().to_string())
}

macro_rules! build_primitive {
    ($column:expr, $ArrowTy:ty, $kind:ident) => {{
        let mut builder = PrimitiveBuilder::<$ArrowTy>::with_capacity($column.len());
        for value in $column.iter() {
            match value {
                Slot::Value(Scalar::$kind(v)) => builder.append_value(v),
                Slot::Missing => builder.append_null(),
                Slot::Value(other) => {
                    return Err(unexpected("column_to_arrow", ElementKind::$kind, &other))
                }
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

/// Converts a single-kind column to an Arrow array of the matching type.
///
/// # Errors
/// `TypeMismatch` for a column whose alternative set is not exactly one kind.
pub fn column_to_arrow(column: &Column) -> Result<ArrayRef> {
    let kind = match column.kinds() {
        [kind] => *kind,
        _ => {
            return Err(LacunaError::type_mismatch(
                "column_to_arrow",
                "a single-kind column",
                column.describe(),
            ))
        }
    };

    let array = match kind {
        ElementKind::Int8 => build_primitive!(column, Int8Type, Int8),
        ElementKind::Int16 => build_primitive!(column, Int16Type, Int16),
        ElementKind::Int32 => build_primitive!(column, Int32Type, Int32),
        ElementKind::Int64 => build_primitive!(column, Int64Type, Int64),
        ElementKind::UInt8 => build_primitive!(column, UInt8Type, UInt8),
        ElementKind::UInt16 => build_primitive!(column, UInt16Type, UInt16),
        ElementKind::UInt32 => build_primitive!(column, UInt32Type, UInt32),
        ElementKind::UInt64 => build_primitive!(column, UInt64Type, UInt64),
        ElementKind::Float32 => build_primitive!(column, Float32Type, Float32),
        ElementKind::Float64 => build_primitive!(column, Float64Type, Float64),
        ElementKind::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(column.len());
            for value in column.iter() {
                match value {
                    Slot::Value(Scalar::Boolean(b)) => builder.append_value(b),
                    Slot::Missing => builder.append_null(),
                    Slot::Value(other) => {
                        return Err(unexpected("column_to_arrow", kind, &other))
                    }
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }
        ElementKind::Utf8 => {
            let mut builder = StringBuilder::with_capacity(column.len(), column.len() * 8);
            for value in column.iter() {
                match value {
                    Slot::Value(Scalar::Utf8(s)) => builder.append_value(&*s),
                    Slot::Missing => builder.append_null(),
                    Slot::Value(other) => {
                        return Err(unexpected("column_to_arrow", kind, &other))
                    }
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }
    };
    log::debug!("column_to_arrow: {} slots as {:?}", array.len(), array.data_type());
    Ok(array)
}

macro_rules! primitive_values {
    ($array:expr, $ArrowTy:ty, $kind:ident) => {
        $array
            .as_primitive_opt::<$ArrowTy>()
            .ok_or_else(|| downcast_failed(ElementKind::$kind))?
            .iter()
            .map(|v| Slot::from(v.map(Scalar::$kind)))
            .collect::<Vec<Value>>()
    };
}

fn downcast_failed(kind: ElementKind) -> LacunaError {
    LacunaError::InternalError(format!("array with data type {} failed to downcast", kind))
}

/// Converts an Arrow array into a single-kind column. Nulls become Missing.
///
/// # Errors
/// `TypeMismatch` for an Arrow type with no `ElementKind` counterpart.
pub fn column_from_arrow(array: &dyn Array) -> Result<Column> {
    let kind = ElementKind::from_arrow_type(array.data_type())?;
    let values: Vec<Value> = match kind {
        ElementKind::Int8 => primitive_values!(array, Int8Type, Int8),
        ElementKind::Int16 => primitive_values!(array, Int16Type, Int16),
        ElementKind::Int32 => primitive_values!(array, Int32Type, Int32),
        ElementKind::Int64 => primitive_values!(array, Int64Type, Int64),
        ElementKind::UInt8 => primitive_values!(array, UInt8Type, UInt8),
        ElementKind::UInt16 => primitive_values!(array, UInt16Type, UInt16),
        ElementKind::UInt32 => primitive_values!(array, UInt32Type, UInt32),
        ElementKind::UInt64 => primitive_values!(array, UInt64Type, UInt64),
        ElementKind::Float32 => primitive_values!(array, Float32Type, Float32),
        ElementKind::Float64 => primitive_values!(array, Float64Type, Float64),
        ElementKind::Boolean => array
            .as_boolean_opt()
            .ok_or_else(|| downcast_failed(kind))?
            .iter()
            .map(|v| Slot::from(v.map(Scalar::Boolean)))
            .collect(),
        ElementKind::Utf8 => array
            .as_string_opt::<i32>()
            .ok_or_else(|| downcast_failed(kind))?
            .iter()
            .map(|v| Slot::from(v.map(Scalar::utf8)))
            .collect(),
    };
    make_collection(&[kind], values.len(), InitialState::FromSequence(values))
}
