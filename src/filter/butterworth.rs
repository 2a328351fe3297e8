//! The four Butterworth filters used by the pre-processor.
//!
//! Cutoff and sample rate must satisfy `0 < cutoff < sample_rate / 2`.
//! The configuration layer checks this; the constructors only assert it in
//! debug builds.
use super::design::{
    gray_markel_all_pass, high_pass_pqd, low_noise_state_space, low_pass_pqd, pole_angle,
    prewarp, stoyanov_all_pass, FirstOrder, StateSpace,
};
use super::section::{FirstOrderSection, SecondOrderSection};
use super::Filter;
use crate::sample::Sample;

fn prewarp_checked(cutoff: f64, sample_rate: f64) -> f64 {
    debug_assert!(
        cutoff > 0.0 && cutoff < sample_rate / 2.0,
        "cutoff {} Hz outside (0, {}) Hz",
        cutoff,
        sample_rate / 2.0
    );
    prewarp(cutoff, sample_rate)
}

/// Second-order high-pass, a single section.
#[derive(Debug, Clone)]
pub struct ButterworthHighPass2<S> {
    section: SecondOrderSection<S>,
}

impl<S: Sample> ButterworthHighPass2<S> {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let wc = prewarp_checked(cutoff, sample_rate);
        let coefficients = low_noise_state_space(&high_pass_pqd(wc, pole_angle(1, 2)));
        ButterworthHighPass2 {
            section: SecondOrderSection::new(&coefficients),
        }
    }
}

impl<S: Sample> Filter<S> for ButterworthHighPass2<S> {
    fn process(&mut self, input: S) -> S {
        self.section.process(input)
    }

    fn reset(&mut self) {
        self.section.reset();
    }
}

/// Fourth-order low-pass, a cascade of two sections.
#[derive(Debug, Clone)]
pub struct ButterworthLowPass4<S> {
    first: SecondOrderSection<S>,
    second: SecondOrderSection<S>,
}

impl<S: Sample> ButterworthLowPass4<S> {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let wc = prewarp_checked(cutoff, sample_rate);
        let first = low_noise_state_space(&low_pass_pqd(wc, pole_angle(1, 4)));
        let second = low_noise_state_space(&low_pass_pqd(wc, pole_angle(2, 4)));
        ButterworthLowPass4 {
            first: SecondOrderSection::new(&first),
            second: SecondOrderSection::new(&second),
        }
    }
}

impl<S: Sample> Filter<S> for ButterworthLowPass4<S> {
    fn process(&mut self, input: S) -> S {
        let intermediate = self.first.process(input);
        self.second.process(intermediate)
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }
}

/// A second-order and a first-order all-pass branch fed the same input;
/// the output is half their difference.
#[derive(Debug, Clone)]
struct ParallelAllPass<S> {
    second: SecondOrderSection<S>,
    first: FirstOrderSection<S>,
    two: S,
}

impl<S: Sample> ParallelAllPass<S> {
    fn new((second, first): (StateSpace, FirstOrder)) -> Self {
        ParallelAllPass {
            second: SecondOrderSection::new(&second),
            first: FirstOrderSection::new(&first),
            two: S::from_i16(2),
        }
    }

    fn process(&mut self, input: S) -> S {
        let y1 = self.first.process(input);
        let y2 = self.second.process(input);
        (y2 - y1) / self.two
    }

    fn reset(&mut self) {
        self.second.reset();
        self.first.reset();
    }
}

/// Third-order high-pass from a Gray-Markel all-pass decomposition.
#[derive(Debug, Clone)]
pub struct ButterworthHighPass3GrayMarkel<S> {
    branches: ParallelAllPass<S>,
}

impl<S: Sample> ButterworthHighPass3GrayMarkel<S> {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let wc = prewarp_checked(cutoff, sample_rate);
        ButterworthHighPass3GrayMarkel {
            branches: ParallelAllPass::new(gray_markel_all_pass(wc)),
        }
    }
}

impl<S: Sample> Filter<S> for ButterworthHighPass3GrayMarkel<S> {
    fn process(&mut self, input: S) -> S {
        self.branches.process(input)
    }

    fn reset(&mut self) {
        self.branches.reset();
    }
}

/// Third-order high-pass from a Stoyanov all-pass decomposition. Same nominal
/// response as [ButterworthHighPass3GrayMarkel], different rounding behaviour.
#[derive(Debug, Clone)]
pub struct ButterworthHighPass3Stoyanov<S> {
    branches: ParallelAllPass<S>,
}

impl<S: Sample> ButterworthHighPass3Stoyanov<S> {
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        let wc = prewarp_checked(cutoff, sample_rate);
        ButterworthHighPass3Stoyanov {
            branches: ParallelAllPass::new(stoyanov_all_pass(wc)),
        }
    }
}

impl<S: Sample> Filter<S> for ButterworthHighPass3Stoyanov<S> {
    fn process(&mut self, input: S) -> S {
        self.branches.process(input)
    }

    fn reset(&mut self) {
        self.branches.reset();
    }
}
