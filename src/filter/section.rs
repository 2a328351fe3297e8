use super::design::{FirstOrder, StateSpace};
use super::Filter;
use crate::sample::Sample;

/// A second-order state-space section with two state registers.
#[derive(Debug, Clone)]
pub struct SecondOrderSection<S> {
    a11: S,
    a12: S,
    a21: S,
    a22: S,
    b1: S,
    b2: S,
    c1: S,
    c2: S,
    d: S,
    x1: S,
    x2: S,
}

impl<S: Sample> SecondOrderSection<S> {
    pub fn new(coefficients: &StateSpace) -> Self {
        SecondOrderSection {
            a11: S::from_f64(coefficients.a11),
            a12: S::from_f64(coefficients.a12),
            a21: S::from_f64(coefficients.a21),
            a22: S::from_f64(coefficients.a22),
            b1: S::from_f64(coefficients.b1),
            b2: S::from_f64(coefficients.b2),
            c1: S::from_f64(coefficients.c1),
            c2: S::from_f64(coefficients.c2),
            d: S::from_f64(coefficients.d),
            x1: S::zero(),
            x2: S::zero(),
        }
    }
}

impl<S: Sample> Filter<S> for SecondOrderSection<S> {
    fn process(&mut self, input: S) -> S {
        let x1 = self.a11 * self.x1 + self.a12 * self.x2 + self.b1 * input;
        let x2 = self.a21 * self.x1 + self.a22 * self.x2 + self.b2 * input;
        let output = self.c1 * self.x1 + self.c2 * self.x2 + self.d * input;
        self.x1 = x1;
        self.x2 = x2;
        output
    }

    fn reset(&mut self) {
        self.x1 = S::zero();
        self.x2 = S::zero();
    }
}

/// A first-order state-space section with one state register.
#[derive(Debug, Clone)]
pub struct FirstOrderSection<S> {
    a: S,
    b: S,
    c: S,
    d: S,
    x: S,
}

impl<S: Sample> FirstOrderSection<S> {
    pub fn new(coefficients: &FirstOrder) -> Self {
        FirstOrderSection {
            a: S::from_f64(coefficients.a),
            b: S::from_f64(coefficients.b),
            c: S::from_f64(coefficients.c),
            d: S::from_f64(coefficients.d),
            x: S::zero(),
        }
    }
}

impl<S: Sample> Filter<S> for FirstOrderSection<S> {
    fn process(&mut self, input: S) -> S {
        let x = self.a * self.x + self.b * input;
        let output = self.c * self.x + self.d * input;
        self.x = x;
        output
    }

    fn reset(&mut self) {
        self.x = S::zero();
    }
}
