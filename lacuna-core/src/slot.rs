//! The `Missing` marker and the `Slot<T>` sum type.
//!
//! `Missing` denotes *statistical* absence: a value that exists in the world
//! but was not observed. It is deliberately not `Option::None`, which means
//! "there is no value here". The two convert into each other losslessly, but
//! only `Slot` participates in the propagation rules of the evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};

//==================================================================================
// 1. The Missing marker
//==================================================================================

/// The singleton missing marker. Zero-sized; every instance is identical.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Missing;

/// The conventional spelling of the marker.
pub const MISSING: Missing = Missing;

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("missing")
    }
}

//==================================================================================
// 2. Slot<T>
//==================================================================================

/// One logical element of a missing-capable collection: either a value of `T`
/// or the missing marker.
///
/// The derived `PartialEq`/`Eq`/`Hash` are *structural*: `Missing == Missing`
/// is `true` here. The propagating comparison (`Missing == Missing` is
/// `Missing`) lives in [`crate::logic::compare`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot<T> {
    Value(T),
    Missing,
}

impl<T> Slot<T> {
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Slot::Missing)
    }

    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self, Slot::Value(_))
    }

    /// Leaves the missing-aware world. `Missing` becomes `None`.
    #[inline]
    pub fn into_option(self) -> Option<T> {
        match self {
            Slot::Value(v) => Some(v),
            Slot::Missing => None,
        }
    }

    #[inline]
    pub fn as_ref(&self) -> Slot<&T> {
        match self {
            Slot::Value(v) => Slot::Value(v),
            Slot::Missing => Slot::Missing,
        }
    }

    /// Applies `f` to a present value; `Missing` passes through untouched.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Slot<U> {
        match self {
            Slot::Value(v) => Slot::Value(f(v)),
            Slot::Missing => Slot::Missing,
        }
    }

    #[inline]
    pub fn and_then<U, F: FnOnce(T) -> Slot<U>>(self, f: F) -> Slot<U> {
        match self {
            Slot::Value(v) => f(v),
            Slot::Missing => Slot::Missing,
        }
    }

    /// Binary propagation: `f` only runs when both sides are present.
    #[inline]
    pub fn zip_with<U, R, F: FnOnce(T, U) -> R>(self, other: Slot<U>, f: F) -> Slot<R> {
        match (self, other) {
            (Slot::Value(a), Slot::Value(b)) => Slot::Value(f(a, b)),
            _ => Slot::Missing,
        }
    }

    /// Substitutes `default` for `Missing`. An explicit-removal step.
    #[inline]
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Slot::Value(v) => v,
            Slot::Missing => default,
        }
    }

    #[inline]
    pub fn unwrap_or_else<F: FnOnce() -> T>(self, f: F) -> T {
        match self {
            Slot::Value(v) => v,
            Slot::Missing => f(),
        }
    }

    /// Returns `self` if present, otherwise `other`.
    #[inline]
    pub fn or(self, other: Slot<T>) -> Slot<T> {
        match self {
            Slot::Value(_) => self,
            Slot::Missing => other,
        }
    }
}

impl<T: Copy> Slot<&T> {
    #[inline]
    pub fn copied(self) -> Slot<T> {
        self.map(|v| *v)
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Missing
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Slot::Value(v),
            None => Slot::Missing,
        }
    }
}

impl<T> From<Slot<T>> for Option<T> {
    fn from(slot: Slot<T>) -> Self {
        slot.into_option()
    }
}

impl<T> From<Missing> for Slot<T> {
    fn from(_: Missing) -> Self {
        Slot::Missing
    }
}

impl<T: fmt::Display> fmt::Display for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(v) => fmt::Display::fmt(v, f),
            Slot::Missing => fmt::Display::fmt(&Missing, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_zero_sized() {
        assert_eq!(std::mem::size_of::<Missing>(), 0);
        assert_eq!(MISSING, Missing);
    }

    #[test]
    fn test_option_conversions_are_lossless() {
        let s: Slot<i32> = Some(4).into();
        assert_eq!(s, Slot::Value(4));
        let s: Slot<i32> = None.into();
        assert!(s.is_missing());
        assert_eq!(Option::<i32>::from(Slot::Value(7)), Some(7));
        assert_eq!(Slot::<u8>::from(MISSING), Slot::Missing);
    }

    #[test]
    fn test_map_and_zip_propagate() {
        assert_eq!(Slot::Value(2).map(|v| v * 10), Slot::Value(20));
        assert_eq!(Slot::<i32>::Missing.map(|v| v * 10), Slot::Missing);
        assert_eq!(Slot::Value(2).zip_with(Slot::Value(3), |a, b| a + b), Slot::Value(5));
        assert_eq!(Slot::Value(2).zip_with(Slot::<i32>::Missing, |a, b| a + b), Slot::Missing);
    }

    #[test]
    fn test_display() {
        assert_eq!(Slot::Value(1.5).to_string(), "1.5");
        assert_eq!(Slot::<f64>::Missing.to_string(), "missing");
    }
}
