//! This module defines shared traits used across storage, logic and evaluation.

use std::sync::Arc;

use crate::slot::{Missing, Slot};
use crate::types::{ElementKind, Scalar};

//==================================================================================
// 1. Bits types
//==================================================================================

/// A fixed-size element type with no internal references, safely
/// representable by raw memory copy. These are the element types the
/// dual-array layout stores inline.
///
/// `Zeroable` lets a freshly allocated missing slot hold a valid (if
/// meaningless) bit pattern, so the values buffer never contains
/// uninitialized memory. Any user type can opt in with
/// `#[derive(Clone, Copy, bytemuck::Zeroable)]`.
pub trait Bits: Copy + bytemuck::Zeroable + 'static {}

impl<T: Copy + bytemuck::Zeroable + 'static> Bits for T {}

//==================================================================================
// 2. Element: the link from Rust primitives to the dynamic value model
//==================================================================================

/// A primitive with a canonical `ElementKind` and `Scalar` representation.
pub trait Element: Bits {
    const KIND: ElementKind;

    fn into_scalar(self) -> Scalar;

    /// Recovers the primitive from a scalar of exactly `Self::KIND`.
    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

macro_rules! impl_element {
    ($T:ty, $variant:ident) => {
        impl Element for $T {
            const KIND: ElementKind = ElementKind::$variant;

            #[inline]
            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[inline]
            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(i16, Int16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(u8, UInt8);
impl_element!(u16, UInt16);
impl_element!(u32, UInt32);
impl_element!(u64, UInt64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);
impl_element!(bool, Boolean);

//==================================================================================
// 3. IsMissing: the one test that never propagates
//==================================================================================

/// Total, never-failing "is this the missing marker?" test.
pub trait IsMissing {
    fn is_missing(&self) -> bool;
}

/// Free-function form of [`IsMissing::is_missing`].
#[inline]
pub fn is_missing<X: IsMissing + ?Sized>(x: &X) -> bool {
    x.is_missing()
}

impl IsMissing for Missing {
    #[inline]
    fn is_missing(&self) -> bool {
        true
    }
}

impl<T> IsMissing for Slot<T> {
    #[inline]
    fn is_missing(&self) -> bool {
        matches!(self, Slot::Missing)
    }
}

impl<X: IsMissing + ?Sized> IsMissing for &X {
    #[inline]
    fn is_missing(&self) -> bool {
        (**self).is_missing()
    }
}

impl<X: IsMissing + ?Sized> IsMissing for Arc<X> {
    #[inline]
    fn is_missing(&self) -> bool {
        (**self).is_missing()
    }
}

// Plain values are never missing.
macro_rules! impl_never_missing {
    ($($T:ty),* $(,)?) => {
        $(
            impl IsMissing for $T {
                #[inline]
                fn is_missing(&self) -> bool {
                    false
                }
            }
        )*
    };
}

impl_never_missing!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_never_missing!(f32, f64, bool, char, str, String, Scalar);
