//! The dynamic value model: one `Scalar` variant per `ElementKind`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::ElementKind;
use crate::slot::Slot;

/// A single non-missing element of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    Utf8(Arc<str>),
}

/// An element of a dynamic collection: a scalar or the missing marker.
pub type Value = Slot<Scalar>;

impl Scalar {
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Int8(_) => ElementKind::Int8,
            Scalar::Int16(_) => ElementKind::Int16,
            Scalar::Int32(_) => ElementKind::Int32,
            Scalar::Int64(_) => ElementKind::Int64,
            Scalar::UInt8(_) => ElementKind::UInt8,
            Scalar::UInt16(_) => ElementKind::UInt16,
            Scalar::UInt32(_) => ElementKind::UInt32,
            Scalar::UInt64(_) => ElementKind::UInt64,
            Scalar::Float32(_) => ElementKind::Float32,
            Scalar::Float64(_) => ElementKind::Float64,
            Scalar::Boolean(_) => ElementKind::Boolean,
            Scalar::Utf8(_) => ElementKind::Utf8,
        }
    }

    pub fn utf8(s: &str) -> Self {
        Scalar::Utf8(Arc::from(s))
    }

    /// Exact integer view. Booleans are 0/1; floats and strings have none.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Scalar::Int8(v) => Some(*v as i128),
            Scalar::Int16(v) => Some(*v as i128),
            Scalar::Int32(v) => Some(*v as i128),
            Scalar::Int64(v) => Some(*v as i128),
            Scalar::UInt8(v) => Some(*v as i128),
            Scalar::UInt16(v) => Some(*v as i128),
            Scalar::UInt32(v) => Some(*v as i128),
            Scalar::UInt64(v) => Some(*v as i128),
            Scalar::Boolean(v) => Some(*v as i128),
            Scalar::Float32(_) | Scalar::Float64(_) | Scalar::Utf8(_) => None,
        }
    }

    /// Floating view of any numeric scalar (possibly lossy for wide integers).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float32(v) => Some(*v as f64),
            Scalar::Float64(v) => Some(*v),
            Scalar::Utf8(_) => None,
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Exact value ordering of two numeric scalars, with no rounding of wide
    /// integers through `f64`. `None` when either side is NaN or not numeric.
    pub fn numeric_cmp(&self, other: &Scalar) -> Option<Ordering> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (Some(a), None) => cmp_int_float(a, float_view(other)?),
            (None, Some(b)) => cmp_int_float(b, float_view(self)?).map(Ordering::reverse),
            (None, None) => float_view(self)?.partial_cmp(&float_view(other)?),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Utf8(s) => Some(&**s),
            _ => None,
        }
    }

    /// Builds an integer-kind scalar, or `None` when `v` does not fit `kind`.
    pub(crate) fn from_i128(kind: ElementKind, v: i128) -> Option<Scalar> {
        Some(match kind {
            ElementKind::Int8 => Scalar::Int8(i8::try_from(v).ok()?),
            ElementKind::Int16 => Scalar::Int16(i16::try_from(v).ok()?),
            ElementKind::Int32 => Scalar::Int32(i32::try_from(v).ok()?),
            ElementKind::Int64 => Scalar::Int64(i64::try_from(v).ok()?),
            ElementKind::UInt8 => Scalar::UInt8(u8::try_from(v).ok()?),
            ElementKind::UInt16 => Scalar::UInt16(u16::try_from(v).ok()?),
            ElementKind::UInt32 => Scalar::UInt32(u32::try_from(v).ok()?),
            ElementKind::UInt64 => Scalar::UInt64(u64::try_from(v).ok()?),
            _ => return None,
        })
    }

    /// Writes the inline bit pattern of a bits-kind scalar into `out`.
    /// Returns the number of bytes written; `None` for reference kinds or a
    /// too-small `out`.
    pub(crate) fn write_bits(&self, out: &mut [u8]) -> Option<usize> {
        let boolean;
        let bytes: &[u8] = match self {
            Scalar::Int8(v) => bytemuck::bytes_of(v),
            Scalar::Int16(v) => bytemuck::bytes_of(v),
            Scalar::Int32(v) => bytemuck::bytes_of(v),
            Scalar::Int64(v) => bytemuck::bytes_of(v),
            Scalar::UInt8(v) => bytemuck::bytes_of(v),
            Scalar::UInt16(v) => bytemuck::bytes_of(v),
            Scalar::UInt32(v) => bytemuck::bytes_of(v),
            Scalar::UInt64(v) => bytemuck::bytes_of(v),
            Scalar::Float32(v) => bytemuck::bytes_of(v),
            Scalar::Float64(v) => bytemuck::bytes_of(v),
            Scalar::Boolean(v) => {
                boolean = *v as u8;
                bytemuck::bytes_of(&boolean)
            }
            Scalar::Utf8(_) => return None,
        };
        out.get_mut(..bytes.len())?.copy_from_slice(bytes);
        Some(bytes.len())
    }

    /// Reads a bits-kind scalar back from its inline bit pattern.
    pub(crate) fn read_bits(kind: ElementKind, bytes: &[u8]) -> Option<Scalar> {
        let width = kind.size_of()?;
        let raw = bytes.get(..width)?;
        Some(match kind {
            ElementKind::Int8 => Scalar::Int8(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Int16 => Scalar::Int16(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Int32 => Scalar::Int32(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Int64 => Scalar::Int64(bytemuck::pod_read_unaligned(raw)),
            ElementKind::UInt8 => Scalar::UInt8(raw[0]),
            ElementKind::UInt16 => Scalar::UInt16(bytemuck::pod_read_unaligned(raw)),
            ElementKind::UInt32 => Scalar::UInt32(bytemuck::pod_read_unaligned(raw)),
            ElementKind::UInt64 => Scalar::UInt64(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Float32 => Scalar::Float32(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Float64 => Scalar::Float64(bytemuck::pod_read_unaligned(raw)),
            ElementKind::Boolean => Scalar::Boolean(raw[0] != 0),
            ElementKind::Utf8 => return None,
        })
    }
}

macro_rules! impl_scalar_from {
    ($($T:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$T> for Scalar {
                fn from(v: $T) -> Self {
                    Scalar::$variant(v)
                }
            }
        )*
    };
}

impl_scalar_from!(
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    f32 => Float32, f64 => Float64, bool => Boolean,
);

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::utf8(s)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int8(v) => fmt::Display::fmt(v, f),
            Scalar::Int16(v) => fmt::Display::fmt(v, f),
            Scalar::Int32(v) => fmt::Display::fmt(v, f),
            Scalar::Int64(v) => fmt::Display::fmt(v, f),
            Scalar::UInt8(v) => fmt::Display::fmt(v, f),
            Scalar::UInt16(v) => fmt::Display::fmt(v, f),
            Scalar::UInt32(v) => fmt::Display::fmt(v, f),
            Scalar::UInt64(v) => fmt::Display::fmt(v, f),
            Scalar::Float32(v) => fmt::Display::fmt(v, f),
            Scalar::Float64(v) => fmt::Display::fmt(v, f),
            Scalar::Boolean(v) => fmt::Display::fmt(v, f),
            Scalar::Utf8(v) => write!(f, "{:?}", v),
        }
    }
}

fn float_view(s: &Scalar) -> Option<f64> {
    match s {
        Scalar::Float32(v) => Some(*v as f64),
        Scalar::Float64(v) => Some(*v),
        _ => None,
    }
}

// 2^127, the first float past i128::MAX.
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Orders an integer against a float exactly. `None` when `f` is NaN.
///
/// The float's integral part is compared in `i128`; a tie falls to the sign
/// of its fractional part.
pub fn cmp_int_float(a: i128, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f.is_infinite() {
        return Some(if f > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let whole = f.trunc();
    if whole >= I128_BOUND {
        return Some(Ordering::Less);
    }
    if whole < -I128_BOUND {
        return Some(Ordering::Greater);
    }
    // `whole` is integral and in range, so the cast is exact.
    match a.cmp(&(whole as i128)) {
        Ordering::Equal => {
            let frac = f - whole;
            Some(if frac > 0.0 {
                Ordering::Less
            } else if frac < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            })
        }
        o => Some(o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_roundtrip_through_slot_bytes() {
        let samples = [
            Scalar::Int8(-3),
            Scalar::Int64(i64::MIN),
            Scalar::UInt16(65_000),
            Scalar::Float32(1.25),
            Scalar::Float64(-0.0),
            Scalar::Boolean(true),
        ];
        let mut slot = [0u8; 8];
        for s in samples {
            let n = s.write_bits(&mut slot).unwrap();
            assert_eq!(Some(n), s.kind().size_of());
            let back = Scalar::read_bits(s.kind(), &slot).unwrap();
            assert_eq!(back, s);
        }
    }

    #[test]
    fn test_utf8_has_no_bits() {
        let mut slot = [0u8; 8];
        assert_eq!(Scalar::utf8("x").write_bits(&mut slot), None);
        assert_eq!(Scalar::read_bits(ElementKind::Utf8, &slot), None);
    }

    #[test]
    fn test_int_float_order_is_exact_near_i64_max() {
        let two_63 = 9_223_372_036_854_775_808.0f64;
        assert_eq!(i64::MAX as f64, two_63);
        let below = Scalar::Int64(i64::MAX - 1);
        let max = Scalar::Int64(i64::MAX);
        let float = Scalar::Float64(two_63);
        assert_eq!(below.numeric_cmp(&float), Some(Ordering::Less));
        assert_eq!(max.numeric_cmp(&float), Some(Ordering::Less));
        assert_eq!(float.numeric_cmp(&max), Some(Ordering::Greater));
        assert_eq!(Scalar::UInt64(1 << 63).numeric_cmp(&float), Some(Ordering::Equal));
    }

    #[test]
    fn test_int_float_fraction_and_non_finite() {
        assert_eq!(cmp_int_float(2, 2.5), Some(Ordering::Less));
        assert_eq!(cmp_int_float(-2, -2.5), Some(Ordering::Greater));
        assert_eq!(cmp_int_float(-3, -2.5), Some(Ordering::Less));
        assert_eq!(cmp_int_float(0, -0.0), Some(Ordering::Equal));
        assert_eq!(cmp_int_float(i128::MAX, f64::INFINITY), Some(Ordering::Less));
        assert_eq!(cmp_int_float(i128::MIN, f64::NEG_INFINITY), Some(Ordering::Greater));
        assert_eq!(cmp_int_float(i128::MAX, 1e300), Some(Ordering::Less));
        assert_eq!(cmp_int_float(i128::MIN, -1e300), Some(Ordering::Greater));
        assert_eq!(cmp_int_float(0, f64::NAN), None);
        assert_eq!(Scalar::Float32(f32::NAN).numeric_cmp(&Scalar::Int8(0)), None);
        assert_eq!(Scalar::utf8("a").numeric_cmp(&Scalar::Int8(0)), None);
    }

    #[test]
    fn test_from_i128_checks_range() {
        assert_eq!(Scalar::from_i128(ElementKind::UInt8, 255), Some(Scalar::UInt8(255)));
        assert_eq!(Scalar::from_i128(ElementKind::UInt8, 256), None);
        assert_eq!(Scalar::from_i128(ElementKind::Int8, -129), None);
        assert_eq!(Scalar::from_i128(ElementKind::Float64, 1), None);
    }
}
