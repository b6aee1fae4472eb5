//! Kleene three-valued connectives over `Slot<bool>`.
//!
//! Missing stands for "true or false, unknown". A connective returns a definite
//! answer exactly when both possible values of the unknown operand give the
//! same classical result.

use crate::slot::Slot;

/// A three-valued boolean.
pub type Tri = Slot<bool>;

pub const TRUE: Tri = Slot::Value(true);
pub const FALSE: Tri = Slot::Value(false);

#[inline]
pub fn and(a: Tri, b: Tri) -> Tri {
    match (a, b) {
        (Slot::Value(false), _) | (_, Slot::Value(false)) => FALSE,
        (Slot::Value(true), Slot::Value(true)) => TRUE,
        _ => Slot::Missing,
    }
}

#[inline]
pub fn or(a: Tri, b: Tri) -> Tri {
    match (a, b) {
        (Slot::Value(true), _) | (_, Slot::Value(true)) => TRUE,
        (Slot::Value(false), Slot::Value(false)) => FALSE,
        _ => Slot::Missing,
    }
}

/// XOR always needs both operands, so any Missing gives Missing.
#[inline]
pub fn xor(a: Tri, b: Tri) -> Tri {
    a.zip_with(b, |x, y| x ^ y)
}

#[inline]
pub fn not(a: Tri) -> Tri {
    a.map(|x| !x)
}
