//! This module defines the core, strongly-typed data representations used
//! throughout lacuna.
//!
//! It includes the canonical `ElementKind` enum (the per-element type of a
//! collection) and the dynamic `Scalar`/`Value` model that dual-array and
//! pointer-based collections exchange with the evaluator.

pub mod element_kind;
pub mod scalar;

// Re-export the main type(s) for easier access.
pub use element_kind::ElementKind;
pub use scalar::{Scalar, Value};
