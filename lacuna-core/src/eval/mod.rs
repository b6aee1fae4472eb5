//! This module contains the propagation machinery: the classification table
//! that assigns each operation a Missing policy, kind promotion with the
//! scalar kernels, the central `Evaluator`, and the typed operator overloads.

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod classify;
pub mod evaluator;
pub mod ops;
pub mod promote;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use classify::{Arity, Operation, OperationTable, Policy, PropagationBehavior};
pub use evaluator::{Evaluator, Operand};
pub use promote::{result_kind, unary_result_kind};

//==================================================================================
// 3. Unit Tests (Module-level)
//==================================================================================

#[cfg(test)]
mod evaluator_tests;
