//! Butterworth coefficient design, carried out in `f64`.
//!
//! A section is first described by its transfer function
//!
//! > H(z) = d + (q1·z⁻¹ + q2·z⁻²) / (1 + p1·z⁻¹ + p2·z⁻²)
//!
//! and then realized in the low round-off noise state-space form of Bomar,
//! which is what [SecondOrderSection][super::SecondOrderSection] iterates.
//! The third-order high-pass filters are realized instead as a parallel pair
//! of all-pass sections.
use std::f64::consts::PI;

use rustfft::num_complex::Complex;

/// Bilinear frequency pre-warp, `tan(π·cutoff/sample_rate)`.
pub fn prewarp(cutoff: f64, sample_rate: f64) -> f64 {
    (PI * cutoff / sample_rate).tan()
}

/// Angle of the `k`-th pole (1-based) of an `order`-th order Butterworth prototype.
pub fn pole_angle(k: usize, order: usize) -> f64 {
    PI / 2.0 * (1.0 + (2 * k - 1) as f64 / order as f64)
}

/// Transfer function coefficients of one second-order section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pqd {
    pub p1: f64,
    pub p2: f64,
    pub q1: f64,
    pub q2: f64,
    pub d: f64,
}

impl Pqd {
    /// Complex response at normalized angular frequency `omega` (radians per sample).
    pub fn frequency_response(&self, omega: f64) -> Complex<f64> {
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let numerator = z1 * self.q1 + z2 * self.q2;
        let denominator = Complex::new(1.0, 0.0) + z1 * self.p1 + z2 * self.p2;
        numerator / denominator + self.d
    }
}

/// High-pass section for prewarped cutoff `wc` and pole angle `theta`.
pub fn high_pass_pqd(wc: f64, theta: f64) -> Pqd {
    let k1 = wc * wc;
    let k2 = 2.0 * wc * theta.cos();
    let d = 1.0 / (1.0 + k1 - k2);
    let p1 = 2.0 * (k1 - 1.0) * d;
    let p2 = (1.0 + k1 + k2) * d;
    Pqd {
        p1,
        p2,
        q1: (-2.0 - p1) * d,
        q2: (1.0 - p2) * d,
        d,
    }
}

/// Low-pass section for prewarped cutoff `wc` and pole angle `theta`.
pub fn low_pass_pqd(wc: f64, theta: f64) -> Pqd {
    let k1 = wc * wc;
    let k2 = 2.0 * wc * theta.cos();
    let den = 1.0 + k1 - k2;
    let d = k1 / den;
    let p1 = 2.0 * (k1 - 1.0) / den;
    let p2 = (1.0 + k1 + k2) / den;
    Pqd {
        p1,
        p2,
        q1: (2.0 - p1) * d,
        q2: (1.0 - p2) * d,
        d,
    }
}

/// State-space matrices of a second-order section:
/// `x' = A·x + b·u`, `y = c·x + d·u`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpace {
    pub a11: f64,
    pub a12: f64,
    pub a21: f64,
    pub a22: f64,
    pub b1: f64,
    pub b2: f64,
    pub c1: f64,
    pub c2: f64,
    pub d: f64,
}

impl StateSpace {
    /// `d + c·(zI - A)⁻¹·b` evaluated on the unit circle.
    pub fn frequency_response(&self, omega: f64) -> Complex<f64> {
        let z = Complex::from_polar(1.0, omega);
        let m11 = z - self.a11;
        let m22 = z - self.a22;
        let det = m11 * m22 - self.a12 * self.a21;
        // Adjugate of (zI - A) applied to b.
        let x1 = (m22 * self.b1 + self.a12 * self.b2) / det;
        let x2 = (m11 * self.b2 + self.a21 * self.b1) / det;
        x1 * self.c1 + x2 * self.c2 + self.d
    }
}

/// Bomar's low-noise realization of `pqd`.
///
/// The expressions are used exactly as written; algebraically equivalent
/// rearrangements lose precision near the unit circle.
pub fn low_noise_state_space(pqd: &Pqd) -> StateSpace {
    let Pqd { p1, p2, q1, q2, d } = *pqd;
    let v1 = q2 / q1;
    let v2 = (v1 * v1 - p1 * v1 + p2).sqrt();
    let v3 = v1 - v2;
    let v4 = v1 + v2;
    let v5 = p2 - 1.0;
    let v6 = p2 + 1.0;
    let v7 = v5 * (v6 * v6 - p1 * p1);
    let v8 = p1 * p1 / 4.0 - p2;

    let b1 = (v7 / (2.0 * p1 * v3 - v6 * (1.0 + v3 * v3))).sqrt();
    let b2 = (v7 / (2.0 * p1 * v4 - v6 * (1.0 + v4 * v4))).sqrt();
    let a21 = (((b2 * b2 + v5) * v8) / (b1 * b1 + v5)).sqrt();
    let a11 = -p1 / 2.0;

    StateSpace {
        a11,
        a12: v8 / a21,
        a21,
        a22: a11,
        b1,
        b2,
        c1: q1 / (2.0 * b1),
        c2: q1 / (2.0 * b2),
        d,
    }
}

/// Scalar state-space form of a first-order section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrder {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl FirstOrder {
    pub fn frequency_response(&self, omega: f64) -> Complex<f64> {
        let z = Complex::from_polar(1.0, omega);
        (z - self.a).inv() * (self.b * self.c) + self.d
    }
}

/// Denominator `1 + B1·z⁻¹ + B2·z⁻²` of the second-order all-pass branch,
/// from the bilinear image of the pole at `theta`.
fn all_pass_denominator(wc: f64, theta: f64) -> (f64, f64) {
    let a0 = 1.0 - 2.0 * wc * theta.cos() + wc * wc;
    let a1 = 2.0 * (wc * wc - 1.0);
    let pole = Complex::new(-a1 / (2.0 * a0), 4.0 * wc * theta.sin() / (2.0 * a0));
    let (radius, angle) = pole.to_polar();
    (-2.0 * radius * angle.cos(), radius * radius)
}

/// Pole of the first-order all-pass branch.
fn first_order_pole(wc: f64) -> f64 {
    (1.0 - wc) / (1.0 + wc)
}

/// Gray-Markel lattice realization of the two all-pass branches of a
/// third-order Butterworth high-pass filter, with sign convention `e1 = e2 = -1`.
pub fn gray_markel_all_pass(wc: f64) -> (StateSpace, FirstOrder) {
    let (b1, b2) = all_pass_denominator(wc, pole_angle(1, 3));
    let k2 = b2;
    let k1 = b1 / (1.0 + b2);
    let (e1, e2) = (-1.0, -1.0);
    let second = StateSpace {
        a11: -k1,
        a12: k1 * e1 + 1.0,
        a21: (k1 * e1 - 1.0) * k2,
        a22: -k2 * k1,
        b1: 0.0,
        b2: k2 * e2 + 1.0,
        c1: (e1 * k1 - 1.0) * (e2 * k2) - e1 * k1 + 1.0,
        c2: k1 * (1.0 - e2 * k2),
        d: k2,
    };

    let k = -first_order_pole(wc);
    let e = -1.0;
    let first = FirstOrder {
        a: -k,
        b: 1.0 + k * e,
        c: 1.0 - k * e,
        d: k,
    };
    (second, first)
}

/// Stoyanov's low-sensitivity realization of the same all-pass pair.
pub fn stoyanov_all_pass(wc: f64) -> (StateSpace, FirstOrder) {
    let (b1, b2) = all_pass_denominator(wc, pole_angle(1, 3));
    let c2 = 1.0 - b2;
    let c1 = (b1 + 2.0 - c2) / 2.0;
    let second = StateSpace {
        a11: 1.0 - c1,
        a12: -c1,
        a21: -c2 - c1 + 2.0,
        a22: -c2 - c1 + 1.0,
        b1: c1,
        b2: c2 + c1 - 2.0,
        c1: c2,
        c2,
        d: 1.0 - c2,
    };

    let c = 1.0 - first_order_pole(wc);
    let first = FirstOrder {
        a: 1.0 - c,
        b: c,
        c: 2.0 - c,
        d: c - 1.0,
    };
    (second, first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HALF_POWER: f64 = std::f64::consts::FRAC_1_SQRT_2;

    fn omega(frequency: f64, sample_rate: f64) -> f64 {
        2.0 * PI * frequency / sample_rate
    }

    #[test]
    fn pole_angles() {
        assert_relative_eq!(pole_angle(1, 2), 3.0 * PI / 4.0);
        assert_relative_eq!(pole_angle(1, 4), 5.0 * PI / 8.0);
        assert_relative_eq!(pole_angle(2, 4), 7.0 * PI / 8.0);
        assert_relative_eq!(pole_angle(1, 3), 2.0 * PI / 3.0);
    }

    #[test]
    fn high_pass_section_half_power_at_cutoff() {
        for &(cutoff, sample_rate) in &[(50.0, 48000.0), (200.0, 8000.0), (3000.0, 44100.0)] {
            let pqd = high_pass_pqd(prewarp(cutoff, sample_rate), pole_angle(1, 2));
            let w = omega(cutoff, sample_rate);
            assert_relative_eq!(pqd.frequency_response(w).norm(), HALF_POWER, epsilon = 1e-9);
            assert_relative_eq!(pqd.frequency_response(PI).norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn low_pass_cascade_half_power_at_cutoff() {
        let (cutoff, sample_rate) = (1000.0, 48000.0);
        let wc = prewarp(cutoff, sample_rate);
        let w = omega(cutoff, sample_rate);
        let first = low_pass_pqd(wc, pole_angle(1, 4));
        let second = low_pass_pqd(wc, pole_angle(2, 4));
        let response = first.frequency_response(w) * second.frequency_response(w);
        assert_relative_eq!(response.norm(), HALF_POWER, epsilon = 1e-9);
        let dc = first.frequency_response(0.0) * second.frequency_response(0.0);
        assert_relative_eq!(dc.norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn low_noise_form_preserves_transfer_function() {
        let sample_rate = 48000.0;
        let wc = prewarp(1000.0, sample_rate);
        for pqd in [
            low_pass_pqd(wc, pole_angle(1, 4)),
            low_pass_pqd(wc, pole_angle(2, 4)),
            high_pass_pqd(prewarp(50.0, sample_rate), pole_angle(1, 2)),
        ] {
            let ss = low_noise_state_space(&pqd);
            assert_eq!(ss.a11, ss.a22);
            for f in [10.0, 200.0, 1000.0, 5000.0, 20000.0] {
                let w = omega(f, sample_rate);
                let expected = pqd.frequency_response(w);
                let actual = ss.frequency_response(w);
                assert_relative_eq!(actual.re, expected.re, epsilon = 1e-9);
                assert_relative_eq!(actual.im, expected.im, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn low_noise_form_is_finite_across_cutoffs() {
        let sample_rate = 8000.0;
        for cutoff in (1..40).map(|i| i as f64 * 95.0) {
            let wc = prewarp(cutoff, sample_rate);
            let sections = [
                low_noise_state_space(&high_pass_pqd(wc, pole_angle(1, 2))),
                low_noise_state_space(&low_pass_pqd(wc, pole_angle(1, 4))),
                low_noise_state_space(&low_pass_pqd(wc, pole_angle(2, 4))),
            ];
            for ss in &sections {
                let all = [ss.a11, ss.a12, ss.a21, ss.a22, ss.b1, ss.b2, ss.c1, ss.c2, ss.d];
                assert!(all.iter().all(|v| v.is_finite()), "cutoff {}: {:?}", cutoff, ss);
            }
        }
    }

    #[test]
    fn all_pass_branches_have_unit_magnitude() {
        let wc = prewarp(200.0, 10000.0);
        for (second, first) in [gray_markel_all_pass(wc), stoyanov_all_pass(wc)] {
            for f in [20.0, 200.0, 2000.0, 4900.0] {
                let w = omega(f, 10000.0);
                assert_relative_eq!(second.frequency_response(w).norm(), 1.0, epsilon = 1e-9);
                assert_relative_eq!(first.frequency_response(w).norm(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn third_order_high_pass_half_power_at_cutoff() {
        let (cutoff, sample_rate) = (200.0, 10000.0);
        let wc = prewarp(cutoff, sample_rate);
        let w = omega(cutoff, sample_rate);
        for (second, first) in [gray_markel_all_pass(wc), stoyanov_all_pass(wc)] {
            let response = (second.frequency_response(w) - first.frequency_response(w)) / 2.0;
            assert_relative_eq!(response.norm(), HALF_POWER, epsilon = 1e-9);
        }
    }
}
