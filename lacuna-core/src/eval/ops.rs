//! Operator overloads for the statically typed path.
//!
//! `Slot<T>` gets the `std::ops` arithmetic operators whenever `T` has them,
//! and `Slot<bool>` gets the Kleene connectives as `&`, `|` and `^`. Each impl
//! is declared against its `Operation`, and the policy of that operation
//! decides how Missing is resolved, so the typed and dynamic paths cannot
//! drift apart.

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};

use crate::eval::classify::{Operation, Policy, PropagationBehavior};
use crate::logic::kleene;
use crate::slot::Slot;

#[inline]
fn propagate2<A, B, R>(op: Operation, a: Slot<A>, b: Slot<B>, f: impl FnOnce(A, B) -> R) -> Slot<R> {
    debug_assert_eq!(op.policy(), Policy::AutoPropagate);
    a.zip_with(b, f)
}

macro_rules! impl_propagating_binop {
    ($($Trait:ident, $method:ident, $op:expr;)*) => {
        $(
            impl<T: $Trait<Output = T>> $Trait for Slot<T> {
                type Output = Slot<T>;

                #[inline]
                fn $method(self, rhs: Slot<T>) -> Slot<T> {
                    propagate2($op, self, rhs, $Trait::$method)
                }
            }
        )*
    };
}

impl_propagating_binop! {
    Add, add, Operation::Add;
    Sub, sub, Operation::Sub;
    Mul, mul, Operation::Mul;
    Div, div, Operation::Div;
    Rem, rem, Operation::Rem;
}

impl<T: Neg<Output = T>> Neg for Slot<T> {
    type Output = Slot<T>;

    #[inline]
    fn neg(self) -> Slot<T> {
        debug_assert_eq!(Operation::Neg.policy(), Policy::AutoPropagate);
        self.map(Neg::neg)
    }
}

/// Logical NOT on `Slot<bool>`, bitwise NOT on integers; Missing stays Missing
/// either way.
impl<T: Not<Output = T>> Not for Slot<T> {
    type Output = Slot<T>;

    #[inline]
    fn not(self) -> Slot<T> {
        debug_assert_eq!(Operation::Not.policy(), Policy::Kleene);
        self.map(Not::not)
    }
}

macro_rules! impl_kleene_binop {
    ($($Trait:ident, $method:ident, $op:expr, $f:path;)*) => {
        $(
            impl $Trait for Slot<bool> {
                type Output = Slot<bool>;

                #[inline]
                fn $method(self, rhs: Slot<bool>) -> Slot<bool> {
                    debug_assert_eq!($op.policy(), Policy::Kleene);
                    $f(self, rhs)
                }
            }
        )*
    };
}

impl_kleene_binop! {
    BitAnd, bitand, Operation::And, kleene::and;
    BitOr, bitor, Operation::Or, kleene::or;
    BitXor, bitxor, Operation::Xor, kleene::xor;
}
