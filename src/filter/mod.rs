//! Single-sample filters: Butterworth sections and automatic gain control.
use std::f64::consts::PI;

use crate::sample::Sample;

pub mod agc;
pub mod butterworth;
pub mod design;
pub mod section;

pub use agc::AutomaticGainControl;
pub use butterworth::{
    ButterworthHighPass2, ButterworthHighPass3GrayMarkel, ButterworthHighPass3Stoyanov,
    ButterworthLowPass4,
};
pub use section::{FirstOrderSection, SecondOrderSection};

/// A stateful single-sample transform. `process` is O(1) and never allocates.
pub trait Filter<S: Sample> {
    fn process(&mut self, input: S) -> S;

    /// Zero the state registers.
    fn reset(&mut self);
}

/// Selects the high-pass realization used by the pre-processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum HighPassKind {
    /// [ButterworthHighPass2]
    SecondOrder,
    /// [ButterworthHighPass3GrayMarkel]
    #[default]
    GrayMarkel,
    /// [ButterworthHighPass3Stoyanov]
    Stoyanov,
}

/// One of the high-pass filters, chosen at run time.
#[derive(Debug, Clone)]
pub enum HighPass<S> {
    SecondOrder(ButterworthHighPass2<S>),
    GrayMarkel(ButterworthHighPass3GrayMarkel<S>),
    Stoyanov(ButterworthHighPass3Stoyanov<S>),
}

impl<S: Sample> HighPass<S> {
    pub fn new(kind: HighPassKind, cutoff: f64, sample_rate: f64) -> Self {
        match kind {
            HighPassKind::SecondOrder => {
                HighPass::SecondOrder(ButterworthHighPass2::new(cutoff, sample_rate))
            }
            HighPassKind::GrayMarkel => {
                HighPass::GrayMarkel(ButterworthHighPass3GrayMarkel::new(cutoff, sample_rate))
            }
            HighPassKind::Stoyanov => {
                HighPass::Stoyanov(ButterworthHighPass3Stoyanov::new(cutoff, sample_rate))
            }
        }
    }

    pub fn kind(&self) -> HighPassKind {
        match self {
            HighPass::SecondOrder(_) => HighPassKind::SecondOrder,
            HighPass::GrayMarkel(_) => HighPassKind::GrayMarkel,
            HighPass::Stoyanov(_) => HighPassKind::Stoyanov,
        }
    }
}

impl<S: Sample> Filter<S> for HighPass<S> {
    fn process(&mut self, input: S) -> S {
        match self {
            HighPass::SecondOrder(f) => f.process(input),
            HighPass::GrayMarkel(f) => f.process(input),
            HighPass::Stoyanov(f) => f.process(input),
        }
    }

    fn reset(&mut self) {
        match self {
            HighPass::SecondOrder(f) => f.reset(),
            HighPass::GrayMarkel(f) => f.reset(),
            HighPass::Stoyanov(f) => f.reset(),
        }
    }
}

/// Measure the gain of `filter` for a sine at `frequency`.
///
/// The filter is reset, driven with a half-scale sine until the transient has
/// died out, and the output RMS is compared with the input RMS over a whole
/// number of quarter seconds. The filter is left reset.
pub fn magnitude_response<S, F>(filter: &mut F, frequency: f64, sample_rate: f64) -> f64
where
    S: Sample,
    F: Filter<S>,
{
    let periods = |n: f64| (n * sample_rate / frequency) as usize;
    let settle = (sample_rate / 2.0) as usize + periods(20.0);
    let measure = ((sample_rate / 4.0) as usize).max(periods(8.0));

    filter.reset();
    let (mut input_power, mut output_power) = (0.0, 0.0);
    for n in 0..settle + measure {
        let x = 0.5 * (2.0 * PI * frequency * n as f64 / sample_rate).sin();
        let y = filter.process(S::from_f64(x)).to_f64();
        if n >= settle {
            input_power += x * x;
            output_power += y * y;
        }
    }
    filter.reset();
    (output_power / input_power).sqrt()
}
