use super::Filter;
use crate::config::AgcConfig;
use crate::sample::Sample;

/// Per-sample pole for a 1/e decay over `tau_ms` milliseconds.
fn decay_factor(tau_ms: f64, sample_rate: f64) -> f64 {
    (-1000.0 / (tau_ms * sample_rate)).exp()
}

/// Automatic gain control.
///
/// Keeps the peak of the output between the lower and upper peak thresholds.
/// The gain falls with the fast time constant and rises with the slow one.
/// A gain step that would leave `[gain_min, gain_max]` is skipped.
#[derive(Debug, Clone)]
pub struct AutomaticGainControl<S> {
    fast_k: S,
    slow_k: S,
    peak_k: S,
    lower_peak_threshold: S,
    upper_peak_threshold: S,
    gain_min: S,
    gain_max: S,
    gain: S,
    peak: S,
}

impl<S: Sample> AutomaticGainControl<S> {
    pub fn new(config: &AgcConfig, sample_rate: f64) -> Self {
        AutomaticGainControl {
            fast_k: S::from_f64(decay_factor(config.fast_tau_ms, sample_rate)),
            slow_k: S::from_f64(decay_factor(config.slow_tau_ms, sample_rate)),
            peak_k: S::from_f64(decay_factor(config.peak_tau_ms, sample_rate)),
            lower_peak_threshold: S::from_f64(config.lower_peak_threshold),
            upper_peak_threshold: S::from_f64(config.upper_peak_threshold),
            gain_min: S::from_f64(config.gain_min),
            gain_max: S::from_f64(config.gain_max),
            gain: S::one(),
            peak: S::zero(),
        }
    }

    pub fn gain(&self) -> S {
        self.gain
    }

    pub fn peak(&self) -> S {
        self.peak
    }
}

impl<S: Sample> Filter<S> for AutomaticGainControl<S> {
    fn process(&mut self, input: S) -> S {
        let output = self.gain * input;

        let magnitude = output.abs();
        if magnitude > self.peak {
            self.peak = magnitude;
        }
        self.peak = self.peak * self.peak_k;

        if self.peak < self.lower_peak_threshold {
            let raised = self.gain / self.slow_k;
            if raised <= self.gain_max {
                self.gain = raised;
            }
        } else if self.peak > self.upper_peak_threshold {
            let lowered = self.gain * self.fast_k;
            if lowered >= self.gain_min {
                self.gain = lowered;
            }
        }

        output
    }

    fn reset(&mut self) {
        self.gain = S::one();
        self.peak = S::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SaturatingFixed;
    use std::f64::consts::PI;

    const SAMPLE_RATE: f64 = 8000.0;

    fn tone(amplitude: f64, n: usize) -> f64 {
        amplitude * (2.0 * PI * 200.0 * n as f64 / SAMPLE_RATE).sin()
    }

    fn silence_raises_gain<S: Sample>() {
        let config = AgcConfig::default();
        let mut agc = AutomaticGainControl::<S>::new(&config, SAMPLE_RATE);
        let target = config.gain_max * decay_factor(config.slow_tau_ms, SAMPLE_RATE);
        // ln(gain_max) time constants.
        let expected = config.gain_max.ln() * config.slow_tau_ms * SAMPLE_RATE / 1000.0;

        let mut samples = 0;
        while agc.gain().to_f64() < target {
            agc.process(S::zero());
            samples += 1;
            assert!(samples as f64 <= 1.1 * expected, "gain stuck at {}", agc.gain());
        }
        assert!(samples as f64 >= 0.9 * expected);

        for _ in 0..SAMPLE_RATE as usize {
            agc.process(S::zero());
            assert!(agc.gain().to_f64() <= config.gain_max);
        }
    }

    fn step_settles<S: Sample>() {
        let config = AgcConfig::default();
        let mut agc = AutomaticGainControl::<S>::new(&config, SAMPLE_RATE);
        for n in 0..SAMPLE_RATE as usize {
            agc.process(S::from_f64(tone(0.1, n)));
        }
        let quiet_gain = agc.gain().to_f64();
        assert!(quiet_gain > 3.0);

        let fast_tau_samples = config.fast_tau_ms * SAMPLE_RATE / 1000.0;
        let mut overshoot = None;
        let mut settled = None;
        for n in 0..2 * SAMPLE_RATE as usize {
            agc.process(S::from_f64(tone(2.0, n)));
            let peak = agc.peak().to_f64();
            let gain = agc.gain().to_f64();
            assert!(gain >= config.gain_min && gain <= config.gain_max);

            match (overshoot, settled) {
                (None, _) if peak > config.upper_peak_threshold => overshoot = Some(n),
                (Some(_), None) if peak <= config.upper_peak_threshold => settled = Some(n),
                (Some(_), Some(_)) => {
                    assert!(peak >= config.lower_peak_threshold);
                    assert!(peak <= config.upper_peak_threshold);
                }
                _ => {}
            }
        }
        let settled = settled.expect("peak never returned to the band");
        assert!((settled as f64) < 4.0 * fast_tau_samples);
        assert!(agc.gain().to_f64() < quiet_gain);
    }

    #[test]
    fn silence_raises_gain_float() {
        silence_raises_gain::<f64>();
    }

    #[test]
    fn silence_raises_gain_fixed() {
        silence_raises_gain::<SaturatingFixed>();
    }

    #[test]
    fn step_settles_float() {
        step_settles::<f64>();
    }

    #[test]
    fn step_settles_fixed() {
        step_settles::<SaturatingFixed>();
    }

    #[test]
    fn output_is_gain_applied_input() {
        let mut agc = AutomaticGainControl::<f64>::new(&AgcConfig::default(), SAMPLE_RATE);
        assert_eq!(agc.process(0.9), 0.9);
        // The peak is above the band, so the gain steps down.
        let gain = agc.gain();
        assert!(gain < 1.0);
        assert_eq!(agc.process(-0.5), -0.5 * gain);
        agc.reset();
        assert_eq!(agc.gain(), 1.0);
        assert_eq!(agc.peak(), 0.0);
    }
}
