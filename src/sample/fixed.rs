use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::{NumericFault, Sample, BINARY_POINT};

const ONE: i64 = 1 << BINARY_POINT;
const RAW_MAX: i64 = i32::MAX as i64;
const RAW_MIN: i64 = i32::MIN as i64;

/// Compile-time rules applied when a fixed-point result leaves the `i32` range.
///
/// Without `SATURATE` an out-of-range result wraps. `RAISE_OVERFLOW` and
/// `RAISE_UNDERFLOW` mark the result with a [NumericFault]; underflow means
/// non-zero operands producing a zero result. Division by zero is always a fault.
pub trait Policy: Copy + Debug + Default + Send + Sync + 'static {
    const SATURATE: bool;
    const RAISE_OVERFLOW: bool;
    const RAISE_UNDERFLOW: bool;
}

/// Clamp to the representable range, never fault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Saturating;

impl Policy for Saturating {
    const SATURATE: bool = true;
    const RAISE_OVERFLOW: bool = false;
    const RAISE_UNDERFLOW: bool = false;
}

/// Clamp, and report overflow and underflow as faults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strict;

impl Policy for Strict {
    const SATURATE: bool = true;
    const RAISE_OVERFLOW: bool = true;
    const RAISE_UNDERFLOW: bool = true;
}

/// Fixed-point sample: `i32` with [BINARY_POINT] fractional bits and `i64`
/// intermediates.
#[derive(Clone, Copy)]
pub struct Fixed<P: Policy> {
    raw: i32,
    fault: Option<NumericFault>,
    policy: PhantomData<P>,
}

pub type SaturatingFixed = Fixed<Saturating>;
pub type StrictFixed = Fixed<Strict>;

impl<P: Policy> Fixed<P> {
    pub fn from_raw(raw: i32) -> Self {
        Fixed {
            raw,
            fault: None,
            policy: PhantomData,
        }
    }

    pub fn raw(self) -> i32 {
        self.raw
    }

    fn with_fault(mut self, fault: Option<NumericFault>) -> Self {
        self.fault = self.fault.or(fault);
        self
    }

    /// Narrow an intermediate result, applying the policy.
    fn narrow(wide: i64, operands_nonzero: bool, inherited: Option<NumericFault>) -> Self {
        let mut fault = inherited;
        if P::RAISE_UNDERFLOW && operands_nonzero && wide == 0 {
            fault = fault.or(Some(NumericFault::Underflow));
        }
        let raw = if (RAW_MIN..=RAW_MAX).contains(&wide) {
            wide as i32
        } else {
            if P::RAISE_OVERFLOW {
                fault = fault.or(Some(NumericFault::Overflow));
            }
            if P::SATURATE {
                wide.clamp(RAW_MIN, RAW_MAX) as i32
            } else {
                wide as i32
            }
        };
        Fixed::from_raw(raw).with_fault(fault)
    }

    fn from_wide_integer(value: i64) -> Self {
        let wide = value.saturating_mul(ONE);
        Self::narrow(wide, false, None)
    }
}

impl<P: Policy> Sample for Fixed<P> {
    fn zero() -> Self {
        Fixed::from_raw(0)
    }
    fn one() -> Self {
        Fixed::from_raw(ONE as i32)
    }
    fn from_i16(value: i16) -> Self {
        Self::from_wide_integer(value as i64)
    }
    fn from_i32(value: i32) -> Self {
        Self::from_wide_integer(value as i64)
    }
    fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }
    fn from_f64(value: f64) -> Self {
        // `as` saturates out-of-range floats, which keeps the overflow check below exact.
        let wide = (value * ONE as f64) as i64;
        Self::narrow(wide, value != 0.0, None)
    }
    fn from_usize(value: usize) -> Self {
        Self::from_wide_integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
    fn to_f64(self) -> f64 {
        self.raw as f64 / ONE as f64
    }
    fn from_device(value: i16) -> Self {
        // The device and the fixed format share the binary point.
        Fixed::from_raw(value as i32)
    }
    fn to_device(self) -> i16 {
        self.raw.clamp(-(ONE as i32), ONE as i32 - 1) as i16
    }
    fn fault(self) -> Option<NumericFault> {
        self.fault
    }
}

impl<P: Policy> Add for Fixed<P> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::narrow(self.raw as i64 + rhs.raw as i64, false, self.fault.or(rhs.fault))
    }
}

impl<P: Policy> Sub for Fixed<P> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::narrow(self.raw as i64 - rhs.raw as i64, false, self.fault.or(rhs.fault))
    }
}

impl<P: Policy> Mul for Fixed<P> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let wide = self.raw as i64 * rhs.raw as i64 / ONE;
        let nonzero = self.raw != 0 && rhs.raw != 0;
        Self::narrow(wide, nonzero, self.fault.or(rhs.fault))
    }
}

impl<P: Policy> Div for Fixed<P> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let inherited = self.fault.or(rhs.fault);
        if rhs.raw == 0 {
            return Fixed::from_raw(0).with_fault(inherited.or(Some(NumericFault::DivideByZero)));
        }
        let wide = self.raw as i64 * ONE / rhs.raw as i64;
        Self::narrow(wide, self.raw != 0, inherited)
    }
}

impl<P: Policy> Neg for Fixed<P> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::narrow(-(self.raw as i64), false, self.fault)
    }
}

impl<P: Policy> PartialEq for Fixed<P> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<P: Policy> PartialOrd for Fixed<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.raw.cmp(&other.raw))
    }
}

impl<P: Policy> Default for Fixed<P> {
    fn default() -> Self {
        Fixed::zero()
    }
}

impl<P: Policy> Debug for Fixed<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixed")
            .field("value", &self.to_f64())
            .field("fault", &self.fault)
            .finish()
    }
}

impl<P: Policy> Display for Fixed<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.to_f64(), f)
    }
}
