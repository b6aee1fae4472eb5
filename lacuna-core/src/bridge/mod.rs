// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is lacuna's boundary with Apache Arrow. It is in-memory interop
// only; nothing here defines a persistence format.
//
// Typed path:
//
//   DualArray<T::Native>  <-- into_arrow / from_arrow -->  PrimitiveArray<T>
//   DualArray<bool>       <-- bool_to_arrow / bool_from_arrow -->  BooleanArray
//
//   The values buffer crosses unchanged; the tag buffer becomes (or comes
//   from) Arrow's validity bitmap.
//
// Dynamic path:
//
//   Column  <-- column_to_arrow / column_from_arrow -->  ArrayRef
//
//   Single-kind columns only, since an Arrow array has one data type.
//
// ====================================================================================

pub mod arrow_impl;

pub use arrow_impl::{
    bool_from_arrow, bool_to_arrow, column_from_arrow, column_to_arrow, from_arrow, into_arrow,
    to_arrow,
};
