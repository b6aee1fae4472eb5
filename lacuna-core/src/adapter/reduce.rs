//! Auto-propagating reductions over slot sequences.
//!
//! Any missing element makes the whole reduction missing. To reduce over the
//! present values only, reduce the output of
//! [`skip_missing`](crate::adapter::skip::skip_missing) instead, e.g. with
//! `Iterator::sum`.

use std::ops::{Add, Mul};

use num_traits::{One, ToPrimitive, Zero};

use crate::error::{LacunaError, Result};
use crate::slot::Slot;

/// Sum of all elements; zero for an empty sequence.
pub fn sum<T, I>(items: I) -> Slot<T>
where
    I: IntoIterator<Item = Slot<T>>,
    T: Zero + Add<Output = T>,
{
    let mut acc = T::zero();
    for item in items {
        match item {
            Slot::Value(v) => acc = acc + v,
            Slot::Missing => return Slot::Missing,
        }
    }
    Slot::Value(acc)
}

/// Product of all elements; one for an empty sequence.
pub fn prod<T, I>(items: I) -> Slot<T>
where
    I: IntoIterator<Item = Slot<T>>,
    T: One + Mul<Output = T>,
{
    let mut acc = T::one();
    for item in items {
        match item {
            Slot::Value(v) => acc = acc * v,
            Slot::Missing => return Slot::Missing,
        }
    }
    Slot::Value(acc)
}

fn is_unordered<T: PartialOrd>(x: &T) -> bool {
    x.partial_cmp(x).is_none()
}

fn extremum<T, I>(items: I, op: &'static str, replaces: fn(&T, &T) -> bool) -> Result<Slot<T>>
where
    I: IntoIterator<Item = Slot<T>>,
    T: PartialOrd,
{
    let mut acc: Option<T> = None;
    for item in items {
        let v = match item {
            Slot::Value(v) => v,
            Slot::Missing => return Ok(Slot::Missing),
        };
        acc = match acc {
            None => Some(v),
            // An unordered value (NaN) poisons the result, as in IEEE max/min.
            Some(a) if is_unordered(&a) => Some(a),
            Some(a) if is_unordered(&v) || replaces(&v, &a) => Some(v),
            keep => keep,
        };
    }
    acc.map(Slot::Value)
        .ok_or(LacunaError::EmptyReduction { op })
}

/// # Errors
/// `EmptyReduction` for an empty sequence.
pub fn maximum<T, I>(items: I) -> Result<Slot<T>>
where
    I: IntoIterator<Item = Slot<T>>,
    T: PartialOrd,
{
    extremum(items, "maximum", |v, acc| v > acc)
}

/// # Errors
/// `EmptyReduction` for an empty sequence.
pub fn minimum<T, I>(items: I) -> Result<Slot<T>>
where
    I: IntoIterator<Item = Slot<T>>,
    T: PartialOrd,
{
    extremum(items, "minimum", |v, acc| v < acc)
}

/// Arithmetic mean as `f64`.
///
/// # Errors
/// `EmptyReduction` for an empty sequence; `Arithmetic` for an element with
/// no `f64` view.
pub fn mean<T, I>(items: I) -> Result<Slot<f64>>
where
    I: IntoIterator<Item = Slot<T>>,
    T: ToPrimitive,
{
    let mut total = 0.0;
    let mut count = 0usize;
    for item in items {
        let v = match item {
            Slot::Value(v) => v,
            Slot::Missing => return Ok(Slot::Missing),
        };
        total += v.to_f64().ok_or_else(|| LacunaError::Arithmetic {
            op: "mean",
            detail: "element has no f64 representation".to_string(),
        })?;
        count += 1;
    }
    if count == 0 {
        return Err(LacunaError::EmptyReduction { op: "mean" });
    }
    Ok(Slot::Value(total / count as f64))
}
