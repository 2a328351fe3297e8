//! Generic [Sample] type which acts as a stand-in for `f32`, `f64` or a
//! fixed-point number.
//!
//! Every filter, the gain control and the tracker are written once against
//! [Sample]. Floating point samples carry no range enforcement. The
//! [Fixed] samples store 15 fractional bits in an `i32` and apply a
//! compile-time [Policy] when a result leaves the representable range.
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use thiserror::Error;

mod fixed;

pub use fixed::{Fixed, Policy, Saturating, SaturatingFixed, Strict, StrictFixed};

/// Number of fractional bits in the device (`i16`) and fixed-point representations.
pub const BINARY_POINT: u32 = 15;

/// Scale between a device sample and the nominal `[-1, 1)` range.
pub(crate) const DEVICE_SCALE: f64 = (1 << BINARY_POINT) as f64;

/// A range violation raised by a fixed-point policy.
///
/// Faults are sticky: every value computed from a faulted value carries the
/// same fault, much like a floating point NaN.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFault {
    #[error("overflow")]
    Overflow,
    #[error("underflow")]
    Underflow,
    #[error("divide by zero")]
    DivideByZero,
}

/// A real value nominally in `[-1, 1)`.
pub trait Sample:
    Copy
    + Debug
    + Display
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn from_i16(value: i16) -> Self;
    fn from_i32(value: i32) -> Self;
    fn from_f32(value: f32) -> Self;
    fn from_f64(value: f64) -> Self;
    fn from_usize(value: usize) -> Self;
    fn to_f64(self) -> f64;

    /// Scale a device sample by `2^-BINARY_POINT`.
    fn from_device(value: i16) -> Self;

    /// Inverse of [Sample::from_device], saturating at the device range.
    fn to_device(self) -> i16;

    fn abs(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }

    /// The policy violation carried by this value, if any.
    fn fault(self) -> Option<NumericFault> {
        None
    }
}

fn float_to_device(value: f64) -> i16 {
    (value * DEVICE_SCALE).clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

macro_rules! impl_float_sample {
    ($t:ty) => {
        impl Sample for $t {
            fn zero() -> Self {
                0.0
            }
            fn one() -> Self {
                1.0
            }
            fn from_i16(value: i16) -> Self {
                value as $t
            }
            fn from_i32(value: i32) -> Self {
                value as $t
            }
            fn from_f32(value: f32) -> Self {
                value as $t
            }
            fn from_f64(value: f64) -> Self {
                value as $t
            }
            fn from_usize(value: usize) -> Self {
                value as $t
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_device(value: i16) -> Self {
                (value as f64 / DEVICE_SCALE) as $t
            }
            fn to_device(self) -> i16 {
                float_to_device(self as f64)
            }
            fn abs(self) -> Self {
                <$t>::abs(self)
            }
        }
    };
}

impl_float_sample!(f32);
impl_float_sample!(f64);

/// The first fault found in `samples`.
pub fn first_fault<'a, S, I>(samples: I) -> Option<NumericFault>
where
    S: Sample,
    I: IntoIterator<Item = &'a S>,
{
    samples.into_iter().find_map(|s| s.fault())
}
