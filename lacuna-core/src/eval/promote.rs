//! Kind promotion and the scalar kernels behind the dynamic evaluator.
//!
//! Everything here works on definite `Scalar`s; Missing never reaches this
//! module, because the evaluator resolves it by policy first.
//!
//! Integer arithmetic is carried out in `i128` with checked operations and
//! then narrowed to the result kind, so overflow is always detected. Float
//! arithmetic follows IEEE (division by zero gives an infinity, not an error).

use std::cmp::Ordering;

use crate::error::{LacunaError, Result};
use crate::eval::classify::Operation;
use crate::types::{ElementKind, Scalar};

//==================================================================================
// 1. Result kinds
//==================================================================================

fn is_arith(kind: ElementKind) -> bool {
    kind.is_numeric()
}

fn mismatch(op: Operation, lhs: ElementKind, rhs: ElementKind) -> LacunaError {
    LacunaError::type_mismatch(
        op.name(),
        format!("operands supported by {}", op),
        format!("({}, {})", lhs, rhs),
    )
}

/// Kind of `lhs op rhs` for a binary operation.
///
/// # Errors
/// `TypeMismatch` for a pairing the operation cannot accept.
pub fn result_kind(op: Operation, lhs: ElementKind, rhs: ElementKind) -> Result<ElementKind> {
    use ElementKind::*;
    use Operation::*;

    match op {
        Add | Sub | Mul | Div | Rem | Min | Max | Pow => {
            if !is_arith(lhs) || !is_arith(rhs) {
                return Err(mismatch(op, lhs, rhs));
            }
            Ok(match (lhs, rhs) {
                (Float32, Float32) => Float32,
                (l, r) if l.is_float() || r.is_float() => Float64,
                (Boolean, _) | (_, Boolean) => Int64,
                (l, r) if l == r => l,
                _ => Int64,
            })
        }
        Concat => match (lhs, rhs) {
            (Utf8, Utf8) => Ok(Utf8),
            _ => Err(mismatch(op, lhs, rhs)),
        },
        // Values of unrelated kinds are simply unequal.
        Eq | Ne => Ok(Boolean),
        Lt | Le | Gt | Ge => {
            let comparable = (is_arith(lhs) && is_arith(rhs)) || (lhs == Utf8 && rhs == Utf8);
            if comparable {
                Ok(Boolean)
            } else {
                Err(mismatch(op, lhs, rhs))
            }
        }
        And | Or | Xor | ShortAnd | ShortOr => match (lhs, rhs) {
            (Boolean, Boolean) => Ok(Boolean),
            _ => Err(mismatch(op, lhs, rhs)),
        },
        Identical | SortEq | SortLess => Ok(Boolean),
        _ => Err(LacunaError::Arity {
            op: op.name(),
            expected: op.arity().operand_count().unwrap_or(0),
            found: 2,
        }),
    }
}

/// Kind of `op x` for a unary operation.
pub fn unary_result_kind(op: Operation, kind: ElementKind) -> Result<ElementKind> {
    use ElementKind::*;
    use Operation::*;

    let reject = || {
        LacunaError::type_mismatch(
            op.name(),
            format!("operands supported by {}", op),
            kind.to_string(),
        )
    };
    match op {
        Neg => match kind {
            Boolean => Ok(Int64),
            k if k.is_unsigned_int() => Ok(Int64),
            k if k.is_signed_int() || k.is_float() => Ok(k),
            _ => Err(reject()),
        },
        Abs => match kind {
            Boolean => Ok(Int64),
            k if k.is_numeric() => Ok(k),
            _ => Err(reject()),
        },
        Sqrt => match kind {
            Float32 => Ok(Float32),
            k if k.is_numeric() => Ok(Float64),
            _ => Err(reject()),
        },
        Not | Branch => match kind {
            Boolean => Ok(Boolean),
            _ => Err(reject()),
        },
        IsMissing => Ok(Boolean),
        _ => Err(LacunaError::Arity {
            op: op.name(),
            expected: op.arity().operand_count().unwrap_or(0),
            found: 1,
        }),
    }
}

//==================================================================================
// 2. Scalar kernels
//==================================================================================

fn overflow(op: Operation, kind: ElementKind) -> LacunaError {
    LacunaError::Arithmetic {
        op: op.name(),
        detail: format!("result overflows {}", kind),
    }
}

fn float_result(kind: ElementKind, v: f64) -> Scalar {
    match kind {
        ElementKind::Float32 => Scalar::Float32(v as f32),
        _ => Scalar::Float64(v),
    }
}

fn int_result(op: Operation, kind: ElementKind, v: Option<i128>) -> Result<Scalar> {
    v.and_then(|v| Scalar::from_i128(kind, v))
        .ok_or_else(|| overflow(op, kind))
}

// Infallible for kinds that passed `result_kind`.
fn numeric_f64(op: Operation, s: &Scalar) -> Result<f64> {
    s.as_f64()
        .ok_or_else(|| LacunaError::InternalError(format!("{}: non-numeric operand {}", op, s)))
}

fn numeric_i128(op: Operation, s: &Scalar) -> Result<i128> {
    s.as_i128()
        .ok_or_else(|| LacunaError::InternalError(format!("{}: non-integer operand {}", op, s)))
}

fn nan_poisoned(a: f64, b: f64, pick_b: bool) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if pick_b {
        b
    } else {
        a
    }
}

/// Applies a binary arithmetic, string or boolean operation to two present
/// scalars.
pub fn apply_binary(op: Operation, lhs: &Scalar, rhs: &Scalar) -> Result<Scalar> {
    use Operation::*;

    let kind = result_kind(op, lhs.kind(), rhs.kind())?;
    match op {
        Concat => {
            let (a, b) = (lhs.as_str().unwrap_or(""), rhs.as_str().unwrap_or(""));
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Scalar::utf8(&out))
        }
        And | Or | Xor | ShortAnd | ShortOr => {
            let (a, b) = (lhs.as_bool().unwrap_or(false), rhs.as_bool().unwrap_or(false));
            Ok(Scalar::Boolean(match op {
                And | ShortAnd => a && b,
                Or | ShortOr => a || b,
                _ => a ^ b,
            }))
        }
        Eq | Ne | Lt | Le | Gt | Ge => Ok(Scalar::Boolean(compare(op, lhs, rhs)?)),
        Identical | SortEq | SortLess => Err(LacunaError::InternalError(format!(
            "{} is resolved by the evaluator, not a scalar kernel",
            op
        ))),
        _ if kind.is_float() => {
            let (a, b) = (numeric_f64(op, lhs)?, numeric_f64(op, rhs)?);
            let v = match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div => a / b,
                Rem => a % b,
                Min => nan_poisoned(a, b, b < a),
                Max => nan_poisoned(a, b, b > a),
                _ => a.powf(b),
            };
            Ok(float_result(kind, v))
        }
        _ => {
            let (a, b) = (numeric_i128(op, lhs)?, numeric_i128(op, rhs)?);
            let v = match op {
                Add => a.checked_add(b),
                Sub => a.checked_sub(b),
                Mul => a.checked_mul(b),
                Div | Rem if b == 0 => {
                    return Err(LacunaError::Arithmetic {
                        op: op.name(),
                        detail: "integer division by zero".to_string(),
                    })
                }
                Div => a.checked_div(b),
                Rem => a.checked_rem(b),
                Min => Some(a.min(b)),
                Max => Some(a.max(b)),
                _ => {
                    let exp = u32::try_from(b).map_err(|_| LacunaError::Arithmetic {
                        op: op.name(),
                        detail: format!("integer exponent {} must be non-negative", b),
                    })?;
                    a.checked_pow(exp)
                }
            };
            int_result(op, kind, v)
        }
    }
}

/// Applies a unary operation to a present scalar.
pub fn apply_unary(op: Operation, x: &Scalar) -> Result<Scalar> {
    use Operation::*;

    let kind = unary_result_kind(op, x.kind())?;
    match op {
        Not | Branch => Ok(Scalar::Boolean(!x.as_bool().unwrap_or(false))),
        IsMissing => Ok(Scalar::Boolean(false)),
        Sqrt => Ok(float_result(kind, numeric_f64(op, x)?.sqrt())),
        Neg | Abs if kind.is_float() => {
            let v = numeric_f64(op, x)?;
            Ok(float_result(kind, if op == Neg { -v } else { v.abs() }))
        }
        _ => {
            let v = numeric_i128(op, x)?;
            let out = if op == Neg { v.checked_neg() } else { v.checked_abs() };
            int_result(op, kind, out)
        }
    }
}

/// Value comparison of two present scalars under IEEE rules.
pub fn compare(op: Operation, lhs: &Scalar, rhs: &Scalar) -> Result<bool> {
    result_kind(op, lhs.kind(), rhs.kind())?;
    let ordering: Option<Ordering> = match (lhs, rhs) {
        (Scalar::Utf8(a), Scalar::Utf8(b)) => Some(a.cmp(b)),
        (Scalar::Utf8(_), _) | (_, Scalar::Utf8(_)) => None,
        // Exact, so a wide integer never rounds onto a neighbouring float.
        _ => lhs.numeric_cmp(rhs),
    };
    Ok(match (op, ordering) {
        // NaN, or unrelated kinds: unequal and unordered.
        (Operation::Ne, None) => true,
        (_, None) => false,
        (Operation::Eq, Some(o)) => o == Ordering::Equal,
        (Operation::Ne, Some(o)) => o != Ordering::Equal,
        (Operation::Lt, Some(o)) => o == Ordering::Less,
        (Operation::Le, Some(o)) => o != Ordering::Greater,
        (Operation::Gt, Some(o)) => o == Ordering::Greater,
        (Operation::Ge, Some(o)) => o != Ordering::Less,
        _ => {
            return Err(LacunaError::InternalError(format!(
                "{} is not a value comparison",
                op
            )))
        }
    })
}
