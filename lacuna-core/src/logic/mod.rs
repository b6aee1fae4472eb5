//! Missing-aware logic: three-valued connectives, value- and identity-level
//! comparison, control-flow resolution, and selection.

pub mod compare;
pub mod control;
pub mod index;
pub mod kleene;
pub mod order;

pub use compare::{all, any, contains, seq_eq, seq_lt, seq_ne};
pub use control::{branch, if_else, short_and, short_or};
pub use index::{select_indices, select_mask};
pub use kleene::Tri;
pub use order::{sort_missing_last, SortOrd};
