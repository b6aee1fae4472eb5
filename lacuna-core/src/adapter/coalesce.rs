//! First-non-missing selection, for single values and broadcast over arrays.

use crate::error::{LacunaError, Result};
use crate::slot::Slot;
use crate::storage::DualArray;
use crate::traits::Bits;

/// Returns the first present candidate, or `Missing` if every candidate is
/// missing (or there are none).
pub fn coalesce<T, I>(candidates: I) -> Slot<T>
where
    I: IntoIterator<Item = Slot<T>>,
{
    candidates
        .into_iter()
        .find(Slot::is_value)
        .unwrap_or(Slot::Missing)
}

/// Lazy variadic coalesce: later candidates are only evaluated when every
/// earlier one is missing.
///
/// ```
/// use lacuna::{coalesce, Slot};
/// let fallback = || Slot::Value(9);
/// assert_eq!(coalesce!(Slot::Missing, Slot::Value(1), fallback()), Slot::Value(1));
/// ```
#[macro_export]
macro_rules! coalesce {
    ($last:expr $(,)?) => {
        $crate::slot::Slot::from($last)
    };
    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::slot::Slot::from($first) {
            $crate::slot::Slot::Missing => $crate::coalesce!($($rest),+),
            present => present,
        }
    };
}

/// One input to a broadcast coalesce.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a, T: Bits> {
    /// Applies to every position.
    Scalar(Slot<T>),
    Array(&'a DualArray<T>),
}

/// Element-wise coalesce. Output slot `i` is the first present value among
/// the candidates at position `i`, or `Missing`.
///
/// Scalars broadcast against arrays; all arrays must share one length. With
/// only scalar candidates the result has a single slot.
///
/// # Errors
/// * `Arity` for an empty candidate list.
/// * `LengthMismatch` when two array candidates differ in length.
pub fn coalesce_broadcast<T: Bits>(candidates: &[Candidate<'_, T>]) -> Result<DualArray<T>> {
    if candidates.is_empty() {
        return Err(LacunaError::Arity {
            op: "coalesce",
            expected: 1,
            found: 0,
        });
    }

    let mut len: Option<usize> = None;
    for candidate in candidates {
        if let Candidate::Array(a) = candidate {
            match len {
                None => len = Some(a.len()),
                Some(n) if n != a.len() => {
                    return Err(LacunaError::length_mismatch("coalesce", n, a.len()))
                }
                Some(_) => {}
            }
        }
    }
    let len = len.unwrap_or(1);

    let mut out = DualArray::with_capacity(len);
    for i in 0..len {
        let slot = coalesce(candidates.iter().map(|c| match c {
            Candidate::Scalar(s) => *s,
            // Lengths were checked above.
            Candidate::Array(a) => a.get(i).unwrap_or(Slot::Missing),
        }));
        out.push(slot);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesce_laws() {
        assert_eq!(coalesce(vec![Slot::Missing, Slot::Value(4)]), Slot::Value(4));
        assert_eq!(coalesce(vec![Slot::<i32>::Missing, Slot::Missing]), Slot::Missing);
        assert_eq!(coalesce(vec![Slot::Value(1), Slot::Value(2)]), Slot::Value(1));
        assert_eq!(coalesce(vec![Slot::Value(1), Slot::Missing]), Slot::Value(1));
        assert_eq!(coalesce(Vec::<Slot<u8>>::new()), Slot::Missing);
    }

    #[test]
    fn test_macro_is_lazy() {
        let mut calls = 0;
        let mut expensive = || {
            calls += 1;
            Slot::Value(0)
        };
        let got = coalesce!(Slot::Value(5), expensive());
        assert_eq!(got, Slot::Value(5));
        assert_eq!(calls, 0);
        let got: Slot<i32> = coalesce!(Slot::Missing, Slot::Missing);
        assert!(got.is_missing());
    }

    #[test]
    fn test_broadcast_pairs_arrays() {
        let a = DualArray::from_slots(vec![Slot::Value(1), Slot::Missing, Slot::Value(2)]);
        let b = DualArray::from_slots(vec![Slot::Value(2), Slot::Value(3), Slot::Missing]);
        let out = coalesce_broadcast(&[Candidate::Array(&a), Candidate::Array(&b)]).unwrap();
        assert_eq!(out.narrow(), Some(vec![1, 3, 2]));
    }

    #[test]
    fn test_broadcast_scalar_fallback() {
        let a = DualArray::from_slots(vec![Slot::Missing, Slot::Value(7i64)]);
        let out = coalesce_broadcast(&[Candidate::Array(&a), Candidate::Scalar(Slot::Value(0))])
            .unwrap();
        assert_eq!(out.narrow(), Some(vec![0, 7]));

        let still_missing =
            coalesce_broadcast(&[Candidate::Array(&a), Candidate::Scalar(Slot::Missing)]).unwrap();
        assert_eq!(still_missing.missing_count(), 1);
    }

    #[test]
    fn test_broadcast_errors() {
        let a = DualArray::<u8>::all_missing(2);
        let b = DualArray::<u8>::all_missing(3);
        assert!(matches!(
            coalesce_broadcast(&[Candidate::Array(&a), Candidate::Array(&b)]),
            Err(LacunaError::LengthMismatch { .. })
        ));
        assert!(matches!(
            coalesce_broadcast::<u8>(&[]),
            Err(LacunaError::Arity { .. })
        ));
    }
}
