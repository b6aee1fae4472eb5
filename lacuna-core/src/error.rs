// In: src/error.rs

//! This module defines the single, unified error type for the entire lacuna library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every fault names the operation that raised it, plus the offending index or
//! value, so a caller can tell "got Missing through propagation" (not an error)
//! apart from "Missing reached a place where a definite value was required".

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LacunaError>;

#[derive(Error, Debug)]
pub enum LacunaError {
    // =========================================================================
    // === Missing-semantics faults
    // =========================================================================
    #[error("{op}: index {index} is out of range for a collection of length {len}")]
    OutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{op}: value of kind {found} is not in the alternative set {expected}")]
    TypeMismatch {
        op: &'static str,
        expected: String,
        found: String,
    },

    #[error("{op}: selector entry at position {position} is missing; selection is indeterminate")]
    IndeterminateIndex { op: &'static str, position: usize },

    #[error("no propagation policy is registered for operation '{op}'")]
    UndefinedOperation { op: String },

    #[error("{op}: missing value reached a control-flow position")]
    ControlFlowOnMissing { op: &'static str },

    // =========================================================================
    // === Shape and arithmetic faults
    // =========================================================================
    #[error("{op}: length mismatch ({left} vs {right})")]
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{op}: {detail}")]
    Arithmetic { op: &'static str, detail: String },

    #[error("{op}: reduction over an empty sequence has no value")]
    EmptyReduction { op: &'static str },

    #[error("{op}: expects {expected} operand(s), got {found}")]
    Arity {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem (e.g. opening a log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error
}

impl LacunaError {
    pub(crate) fn out_of_range(op: &'static str, index: usize, len: usize) -> Self {
        log::debug!("{}: out-of-range access at {} (len {})", op, index, len);
        LacunaError::OutOfRange { op, index, len }
    }

    pub(crate) fn control_flow(op: &'static str) -> Self {
        log::debug!("{}: missing reached a branch decision", op);
        LacunaError::ControlFlowOnMissing { op }
    }

    pub(crate) fn indeterminate(op: &'static str, position: usize) -> Self {
        log::debug!("{}: missing selector at position {}", op, position);
        LacunaError::IndeterminateIndex { op, position }
    }

    pub(crate) fn type_mismatch(
        op: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let (expected, found) = (expected.into(), found.into());
        log::debug!("{}: kind {} rejected by {}", op, found, expected);
        LacunaError::TypeMismatch {
            op,
            expected,
            found,
        }
    }

    pub(crate) fn length_mismatch(op: &'static str, left: usize, right: usize) -> Self {
        LacunaError::LengthMismatch { op, left, right }
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for LacunaError {
    fn from(err: bytemuck::PodCastError) -> Self {
        LacunaError::PodCast(err.to_string())
    }
}
