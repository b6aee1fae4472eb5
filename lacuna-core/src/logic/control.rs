//! Control-flow positions: places where a definite `bool` is required.
//!
//! A branch cannot take "both paths", so Missing here is a fault, never a
//! silent `false`.

use crate::error::{LacunaError, Result};
use crate::logic::kleene::Tri;
use crate::slot::Slot;

/// Resolves a condition for branching.
///
/// # Errors
/// `ControlFlowOnMissing` when `condition` is Missing.
#[inline]
pub fn branch(op: &'static str, condition: Tri) -> Result<bool> {
    match condition {
        Slot::Value(b) => Ok(b),
        Slot::Missing => Err(LacunaError::control_flow(op)),
    }
}

/// Short-circuit `&&`. Only `lhs` is in a control-flow position; `rhs` is
/// evaluated when `lhs` is true and returned as-is, Missing included.
pub fn short_and<F>(lhs: Tri, rhs: F) -> Result<Tri>
where
    F: FnOnce() -> Tri,
{
    if branch("&&", lhs)? {
        Ok(rhs())
    } else {
        Ok(Slot::Value(false))
    }
}

/// Short-circuit `||`, mirroring [`short_and`].
pub fn short_or<F>(lhs: Tri, rhs: F) -> Result<Tri>
where
    F: FnOnce() -> Tri,
{
    if branch("||", lhs)? {
        Ok(Slot::Value(true))
    } else {
        Ok(rhs())
    }
}

/// `if condition { then } else { otherwise }` with lazily evaluated arms.
pub fn if_else<T, A, B>(condition: Tri, then: A, otherwise: B) -> Result<T>
where
    A: FnOnce() -> T,
    B: FnOnce() -> T,
{
    if branch("if", condition)? {
        Ok(then())
    } else {
        Ok(otherwise())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_on_missing_is_fault() {
        assert!(branch("if", Slot::Value(true)).unwrap());
        assert!(matches!(
            branch("while", Slot::Missing),
            Err(LacunaError::ControlFlowOnMissing { op: "while" })
        ));
    }

    #[test]
    fn test_short_circuit_skips_rhs() {
        let mut evaluated = false;
        let out = short_and(Slot::Value(false), || {
            evaluated = true;
            Slot::Value(true)
        })
        .unwrap();
        assert_eq!(out, Slot::Value(false));
        assert!(!evaluated);

        let out = short_or(Slot::Value(true), || Slot::Missing).unwrap();
        assert_eq!(out, Slot::Value(true));
    }

    #[test]
    fn test_short_circuit_tail_may_be_missing() {
        assert_eq!(short_and(Slot::Value(true), || Slot::Missing).unwrap(), Slot::Missing);
        assert_eq!(short_or(Slot::Value(false), || Slot::Missing).unwrap(), Slot::Missing);
        assert!(short_and(Slot::Missing, || Slot::Value(true)).is_err());
        assert!(short_or(Slot::Missing, || Slot::Value(true)).is_err());
    }

    #[test]
    fn test_if_else() {
        assert_eq!(if_else(Slot::Value(false), || 1, || 2).unwrap(), 2);
        assert!(if_else(Slot::Missing, || 1, || 2).is_err());
    }
}
