//! Value-level comparisons. A comparison needs both operands, so any Missing
//! operand makes the result Missing; float comparisons follow IEEE (NaN is
//! unequal to everything, including itself).
//!
//! The sequence forms short-circuit on a definite answer: `[1, 2, 3]` vs
//! `[1, 9, Missing]` is `false`, not Missing, because position 1 already
//! differs.

use crate::logic::kleene::{self, Tri};
use crate::slot::Slot;

macro_rules! define_pairwise {
    ($($(#[$doc:meta])* $name:ident, $bound:ident, |$a:ident, $b:ident| $body:expr;)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name<L, R>(lhs: Slot<L>, rhs: Slot<R>) -> Tri
            where
                L: $bound<R>,
            {
                lhs.zip_with(rhs, |$a, $b| $body)
            }
        )*
    };
}

define_pairwise! {
    eq, PartialEq, |a, b| a == b;
    ne, PartialEq, |a, b| a != b;
    lt, PartialOrd, |a, b| a < b;
    le, PartialOrd, |a, b| a <= b;
    gt, PartialOrd, |a, b| a > b;
    ge, PartialOrd, |a, b| a >= b;
}

/// Element-wise equality of two sequences.
///
/// Sequences of different lengths are definitely unequal. Otherwise a single
/// definitely-unequal pair decides `false`; if no pair does, any Missing
/// comparison leaves the answer Missing.
pub fn seq_eq<L, R, A, B>(lhs: A, rhs: B) -> Tri
where
    A: IntoIterator<Item = Slot<L>>,
    B: IntoIterator<Item = Slot<R>>,
    L: PartialEq<R>,
{
    let mut lhs = lhs.into_iter();
    let mut rhs = rhs.into_iter();
    let mut saw_missing = false;
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => break,
            (Some(_), None) | (None, Some(_)) => return kleene::FALSE,
            (Some(a), Some(b)) => match eq(a, b) {
                Slot::Value(false) => return kleene::FALSE,
                Slot::Value(true) => {}
                Slot::Missing => saw_missing = true,
            },
        }
    }
    if saw_missing {
        Slot::Missing
    } else {
        kleene::TRUE
    }
}

pub fn seq_ne<L, R, A, B>(lhs: A, rhs: B) -> Tri
where
    A: IntoIterator<Item = Slot<L>>,
    B: IntoIterator<Item = Slot<R>>,
    L: PartialEq<R>,
{
    kleene::not(seq_eq(lhs, rhs))
}

/// Lexicographic less-than.
///
/// The first position whose pair is not definitely equal decides: Missing
/// there gives Missing, otherwise the pair's `<`. An exhausted common prefix
/// compares lengths.
pub fn seq_lt<T, A, B>(lhs: A, rhs: B) -> Tri
where
    A: IntoIterator<Item = Slot<T>>,
    B: IntoIterator<Item = Slot<T>>,
    T: PartialOrd,
{
    let mut lhs = lhs.into_iter();
    let mut rhs = rhs.into_iter();
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => return kleene::FALSE,
            (None, Some(_)) => return kleene::TRUE,
            (Some(_), None) => return kleene::FALSE,
            (Some(a), Some(b)) => match (a, b) {
                (Slot::Value(a), Slot::Value(b)) => {
                    if a == b {
                        continue;
                    }
                    // Unordered pairs (NaN) compare false, as `<` does.
                    return Slot::Value(a < b);
                }
                _ => return Slot::Missing,
            },
        }
    }
}

/// Kleene conjunction over a sequence; `true` when empty.
pub fn all<I>(items: I) -> Tri
where
    I: IntoIterator<Item = Tri>,
{
    let mut acc = kleene::TRUE;
    for item in items {
        acc = kleene::and(acc, item);
        if acc == kleene::FALSE {
            break;
        }
    }
    acc
}

/// Kleene disjunction over a sequence; `false` when empty.
pub fn any<I>(items: I) -> Tri
where
    I: IntoIterator<Item = Tri>,
{
    let mut acc = kleene::FALSE;
    for item in items {
        acc = kleene::or(acc, item);
        if acc == kleene::TRUE {
            break;
        }
    }
    acc
}

/// Membership as a disjunction of equalities. A Missing needle in a
/// non-empty haystack is Missing; nothing is a member of an empty one.
pub fn contains<T, I>(haystack: I, needle: Slot<T>) -> Tri
where
    I: IntoIterator<Item = Slot<T>>,
    T: PartialEq + Clone,
{
    any(haystack.into_iter().map(|item| eq(item, needle.clone())))
}
