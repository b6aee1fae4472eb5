//! The explicit-removal and reduction adapters.
//!
//! `skip` and `coalesce` are the only sanctioned ways to turn data that may
//! contain Missing into data that definitely does not. `reduce` holds the
//! auto-propagating reductions that consume a whole sequence.

pub mod coalesce;
pub mod reduce;
pub mod skip;

pub use coalesce::{coalesce, coalesce_broadcast, Candidate};
pub use skip::{skip_missing, SkipMissing};
