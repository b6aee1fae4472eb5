//! This file is the root of the `lacuna` Rust crate: collections and
//! operations for values that may be missing.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`storage`, `logic`,
//!     `eval`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of names most callers need, so that
//!     `use lacuna::{Slot, DualArray, Evaluator}` is enough to get started.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod error;
pub mod eval;
pub mod logic;
pub mod slot;
pub mod storage;
pub mod traits;
pub mod types;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use adapter::{coalesce, coalesce_broadcast, skip_missing, Candidate, SkipMissing};
pub use config::LacunaConfig;
pub use error::{LacunaError, Result};
pub use eval::{Evaluator, Operand, Operation, Policy};
pub use logic::Tri;
pub use slot::{Missing, Slot, MISSING};
pub use storage::{make_collection, Column, DualArray, InitialState};
pub use traits::{is_missing, Bits, Element, IsMissing};
pub use types::{ElementKind, Scalar, Value};
