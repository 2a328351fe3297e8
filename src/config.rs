//! Configuration for the pre-processor, the gain control and the tracker.
//!
//! All values are plain numbers fixed at construction. `Default` gives the
//! settings a guitar tuner runs with.

use crate::error::{Error, Result};
pub use crate::filter::HighPassKind;

/// Automatic gain control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AgcConfig {
    /// Time constant of the downward (attack) gain adjustment in ms (default: 50)
    pub fast_tau_ms: f64,

    /// Time constant of the upward gain adjustment in ms (default: 50)
    pub slow_tau_ms: f64,

    /// Decay time constant of the peak estimate in ms (default: 50)
    pub peak_tau_ms: f64,

    /// Gain rises while the peak is below this level (default: 0.4)
    pub lower_peak_threshold: f64,

    /// Gain falls while the peak is above this level (default: 0.6)
    pub upper_peak_threshold: f64,

    /// Smallest gain (default: 0.1)
    pub gain_min: f64,

    /// Largest gain (default: 10.0)
    pub gain_max: f64,
}

impl Default for AgcConfig {
    fn default() -> Self {
        Self {
            fast_tau_ms: 50.0,
            slow_tau_ms: 50.0,
            peak_tau_ms: 50.0,
            lower_peak_threshold: 0.4,
            upper_peak_threshold: 0.6,
            gain_min: 0.1,
            gain_max: 10.0,
        }
    }
}

impl AgcConfig {
    pub fn validate(&self) -> Result<()> {
        let taus = [self.fast_tau_ms, self.slow_tau_ms, self.peak_tau_ms];
        if taus.iter().any(|tau| !(tau.is_finite() && *tau > 0.0)) {
            return Err(Error::InvalidConfig(format!(
                "AGC time constants must be positive, got {:?}",
                taus
            )));
        }
        if !(0.0 < self.lower_peak_threshold && self.lower_peak_threshold < self.upper_peak_threshold)
        {
            return Err(Error::InvalidConfig(format!(
                "AGC peak thresholds must satisfy 0 < lower < upper, got {} and {}",
                self.lower_peak_threshold, self.upper_peak_threshold
            )));
        }
        // The gain starts at 1.
        if !(0.0 < self.gain_min && self.gain_min <= 1.0 && 1.0 <= self.gain_max) {
            return Err(Error::InvalidConfig(format!(
                "AGC gain range [{}, {}] must contain 1",
                self.gain_min, self.gain_max
            )));
        }
        Ok(())
    }
}

/// Pre-processor parameters. Durations are converted to sample counts at the
/// sub-sampled rate with integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PreProcessorConfig {
    /// Channel extracted from multi-channel frames (default: 0)
    pub channel: usize,

    /// YIN integration window in ms (default: 25)
    pub window_length_ms: usize,

    /// Largest lag searched by YIN in ms (default: 20)
    pub max_lag_ms: usize,

    /// Time between two pitch estimates in ms (default: 10)
    pub sample_interval_ms: usize,

    /// Decimation ratio applied after the low-pass filter (default: 1)
    pub sub_sample: usize,

    /// Low-pass cutoff in Hz, at the source rate (default: 1000)
    pub low_pass_cutoff: f64,

    /// High-pass cutoff in Hz, at the sub-sampled rate (default: 200)
    pub high_pass_cutoff: f64,

    /// Realization of the high-pass filter (default: GrayMarkel)
    pub high_pass_kind: HighPassKind,

    /// Run the high-pass stage (default: true)
    pub enable_high_pass: bool,

    /// Run the AGC stage after the high-pass stage (default: true)
    pub enable_agc: bool,

    pub agc: AgcConfig,
}

impl Default for PreProcessorConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            window_length_ms: 25,
            max_lag_ms: 20,
            sample_interval_ms: 10,
            sub_sample: 1,
            low_pass_cutoff: 1000.0,
            high_pass_cutoff: 200.0,
            high_pass_kind: HighPassKind::default(),
            enable_high_pass: true,
            enable_agc: true,
            agc: AgcConfig::default(),
        }
    }
}

/// Sample counts derived from a [PreProcessorConfig] and a source rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizes {
    pub sub_sample_rate: usize,
    /// Decimated samples appended per read.
    pub sub_sampled_interval: usize,
    /// Source frames consumed per read.
    pub sample_interval: usize,
    pub window_length: usize,
    pub max_lags: usize,
    /// `window_length + max_lags + 1`
    pub output_size: usize,
}

impl PreProcessorConfig {
    /// Sample counts at `sample_rate`. Does not validate.
    pub fn frame_sizes(&self, sample_rate: usize) -> FrameSizes {
        let sub = self.sub_sample.max(1);
        let to_samples = |ms: usize| ms * sample_rate / (1000 * sub);
        let sub_sampled_interval = to_samples(self.sample_interval_ms);
        let window_length = to_samples(self.window_length_ms);
        let max_lags = to_samples(self.max_lag_ms);
        FrameSizes {
            sub_sample_rate: sample_rate / sub,
            sub_sampled_interval,
            sample_interval: sub * sub_sampled_interval,
            window_length,
            max_lags,
            output_size: window_length + max_lags + 1,
        }
    }

    pub fn validate(&self, sample_rate: usize, samples_per_frame: usize) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be positive".into()));
        }
        if self.channel >= samples_per_frame {
            return Err(Error::InvalidConfig(format!(
                "channel {} out of range for {} channel(s)",
                self.channel, samples_per_frame
            )));
        }
        if self.sub_sample == 0 {
            return Err(Error::InvalidConfig("sub-sample ratio must be at least 1".into()));
        }

        let sizes = self.frame_sizes(sample_rate);
        if sizes.sub_sampled_interval == 0 || sizes.window_length == 0 {
            return Err(Error::InvalidConfig(format!(
                "interval of {} ms and window of {} ms are empty at {} Hz",
                self.sample_interval_ms, self.window_length_ms, sizes.sub_sample_rate
            )));
        }
        if sizes.max_lags < 2 {
            return Err(Error::InvalidConfig(format!(
                "max lag of {} ms covers fewer than 2 samples at {} Hz",
                self.max_lag_ms, sizes.sub_sample_rate
            )));
        }

        check_cutoff("low-pass", self.low_pass_cutoff, sample_rate as f64)?;
        if self.enable_high_pass {
            check_cutoff(
                "high-pass",
                self.high_pass_cutoff,
                sizes.sub_sample_rate as f64,
            )?;
        }
        if self.enable_agc {
            self.agc.validate()?;
        }
        Ok(())
    }
}

fn check_cutoff(name: &str, cutoff: f64, sample_rate: f64) -> Result<()> {
    if cutoff > 0.0 && cutoff < sample_rate / 2.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} cutoff {} Hz must lie in (0, {}) Hz",
            name,
            cutoff,
            sample_rate / 2.0
        )))
    }
}

/// How the tracker computes the lag products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Correlation {
    /// One inner product per lag, in sample arithmetic.
    #[default]
    Direct,
    /// FFT cross-correlation in `f64`.
    Fft,
}

/// YIN parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct YinConfig {
    /// Bound on the interpolated cumulative mean normalized difference, and
    /// on the window energy below which the frame is silent (default: 0.1)
    pub threshold: f64,

    /// Subtract the per-lag DC bias from the difference function (default: false)
    pub remove_dc: bool,

    pub correlation: Correlation,
}

impl Default for YinConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            remove_dc: false,
            correlation: Correlation::Direct,
        }
    }
}

impl YinConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_finite() && self.threshold > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "YIN threshold must be positive, got {}",
                self.threshold
            )))
        }
    }
}
