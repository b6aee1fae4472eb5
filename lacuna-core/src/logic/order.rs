//! Identity-level ordering and equality: the comparisons that never return
//! Missing.
//!
//! `SortOrd` is a total order per element type. `Slot<T>` extends it by
//! placing Missing strictly after every present value, and treating two
//! Missings as equal.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::slot::Slot;
use crate::types::scalar::cmp_int_float;
use crate::types::Scalar;

pub trait SortOrd {
    fn sort_cmp(&self, other: &Self) -> Ordering;

    fn sort_eq(&self, other: &Self) -> bool {
        self.sort_cmp(other) == Ordering::Equal
    }

    fn sort_less(&self, other: &Self) -> bool {
        self.sort_cmp(other) == Ordering::Less
    }
}

macro_rules! impl_sort_ord_via_ord {
    ($($T:ty),* $(,)?) => {
        $(
            impl SortOrd for $T {
                #[inline]
                fn sort_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

impl_sort_ord_via_ord!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_sort_ord_via_ord!(bool, char, str, String);

/// NaN sorts after every number and equals itself; otherwise IEEE total
/// order (so `-0.0` sorts before `0.0`).
macro_rules! impl_sort_ord_float {
    ($($T:ty),*) => {
        $(
            impl SortOrd for $T {
                #[inline]
                fn sort_cmp(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => self.total_cmp(other),
                    }
                }
            }
        )*
    };
}

impl_sort_ord_float!(f32, f64);

impl<T: SortOrd> SortOrd for Slot<T> {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Slot::Value(a), Slot::Value(b)) => a.sort_cmp(b),
            (Slot::Value(_), Slot::Missing) => Ordering::Less,
            (Slot::Missing, Slot::Value(_)) => Ordering::Greater,
            (Slot::Missing, Slot::Missing) => Ordering::Equal,
        }
    }
}

impl<T: SortOrd + ?Sized> SortOrd for &T {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        (**self).sort_cmp(*other)
    }
}

impl<T: SortOrd + ?Sized> SortOrd for Arc<T> {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        (**self).sort_cmp(other)
    }
}

/// Scalars of different numeric kinds compare exactly by value. NaN sorts
/// after every number, `-0.0` sits just below integer zero, and strings sort
/// after every number.
impl SortOrd for Scalar {
    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Utf8(a), Scalar::Utf8(b)) => a.sort_cmp(b),
            (Scalar::Utf8(_), _) => Ordering::Greater,
            (_, Scalar::Utf8(_)) => Ordering::Less,
            _ => match (self.as_i128(), other.as_i128()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(a), None) => int_float_sort_cmp(a, float_of(other)),
                (None, Some(b)) => int_float_sort_cmp(b, float_of(self)).reverse(),
                (None, None) => float_of(self).sort_cmp(&float_of(other)),
            },
        }
    }
}

fn float_of(s: &Scalar) -> f64 {
    s.as_f64().unwrap_or(f64::NAN)
}

fn int_float_sort_cmp(a: i128, f: f64) -> Ordering {
    match cmp_int_float(a, f) {
        None => Ordering::Less,
        // Keeps -0.0 < 0 == 0.0 consistent with float total order.
        Some(Ordering::Equal) if f == 0.0 && f.is_sign_negative() => Ordering::Greater,
        Some(o) => o,
    }
}

/// Stable sort with Missing entries moved after all present ones.
pub fn sort_missing_last<T: SortOrd>(items: &mut [Slot<T>]) {
    items.sort_by(|a, b| a.sort_cmp(b));
}
