//! The YIN pitch tracker, after
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//!
//! Let $x_0, x_1, \ldots$ be the window read newest first and $W$ the
//! integration window. For every lag $t = 1 \ldots L$ the tracker forms the
//! difference function
//! $$ d(t) = r(0) + r_t(0) - 2 r(t), \qquad r(t) = \sum_{i=0}^{W-1} x_i x_{i+t}, $$
//! optionally minus the bias a DC offset adds to it,
//! $$ \frac{1}{W} \Big( \sum_{i=0}^{W-1} x_i - \sum_{i=0}^{W-1} x_{i+t} \Big)^2, $$
//! and normalizes it by its running mean,
//! $$ d\'(t) = \frac{t \cdot d(t)}{\sum_{j=1}^t d(j)}, \qquad d\'(0) = 1. $$
//!
//! The first local minimum of $d\'$ is refined with a parabola through its
//! two neighbours. The frame is voiced when the vertex of that parabola lies
//! below the threshold, and the pitch is the sample rate divided by the
//! vertex lag. Only the first local minimum is considered.
//!
//! Frames whose energy $r(0)$ is below the threshold are reported unvoiced
//! without searching.
//!
//! ## Implementation
//! With [Correlation::Direct](crate::config::Correlation::Direct) every
//! product is evaluated in sample arithmetic, one lag at a time, and the
//! search stops at the accepted minimum. With
//! [Correlation::Fft](crate::config::Correlation::Fft) the difference
//! function for all lags is computed up front in `f64` with an
//! [FFT](https://en.wikipedia.org/wiki/Fast_Fourier_transform), which is
//! much faster for long windows.

use std::collections::VecDeque;

use log::trace;

use crate::config::YinConfig;
use crate::detector::internals::{
    dc_correction_at, difference_at, newest_first, windowed_square_error, yin_normalize_at,
    DetectorInternals,
};
use crate::detector::{PitchEstimate, PitchTracker};
use crate::error::{Error, Result};
use crate::preprocessor::PreProcessor;
use crate::sample::{first_fault, Sample};
use crate::trace::{NoTrace, TraceSink};
use crate::utils::buffer::{inner_product, sum};
use crate::utils::peak::{newton_parabola, Point};

pub struct YinTracker<S: Sample, T: TraceSink<S> = NoTrace> {
    config: YinConfig,
    sample_rate: f64,
    internals: DetectorInternals<S>,
    voiced: bool,
    trace: T,
}

impl<S: Sample> YinTracker<S> {
    /// A tracker for windows of `window_length + max_lags + 1` samples at `sample_rate`.
    pub fn new(
        sample_rate: usize,
        window_length: usize,
        max_lags: usize,
        config: YinConfig,
    ) -> Result<Self> {
        Self::with_trace(sample_rate, window_length, max_lags, config, NoTrace)
    }

    /// A tracker sized for the windows `pre` produces.
    pub fn from_preprocessor<U: TraceSink<S>>(
        pre: &PreProcessor<S, U>,
        config: YinConfig,
    ) -> Result<Self> {
        Self::new(pre.sub_sample_rate(), pre.window_length(), pre.max_lags(), config)
    }
}

impl<S: Sample, T: TraceSink<S>> YinTracker<S, T> {
    pub fn with_trace(
        sample_rate: usize,
        window_length: usize,
        max_lags: usize,
        config: YinConfig,
        trace: T,
    ) -> Result<Self> {
        config.validate()?;
        if sample_rate == 0 || window_length == 0 || max_lags < 2 {
            return Err(Error::InvalidConfig(format!(
                "YIN needs a positive rate and window and at least 2 lags, got {} Hz, {} and {}",
                sample_rate, window_length, max_lags
            )));
        }
        Ok(YinTracker {
            config,
            sample_rate: sample_rate as f64,
            internals: DetectorInternals::new(window_length, max_lags, config.correlation),
            voiced: false,
            trace,
        })
    }

    /// Samples required in each window.
    pub fn required_size(&self) -> usize {
        self.internals.size
    }

    pub fn config(&self) -> &YinConfig {
        &self.config
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    pub fn into_trace(self) -> T {
        self.trace
    }

    fn unvoiced(&mut self) -> Result<PitchEstimate> {
        self.voiced = false;
        self.trace.pitch(0.0, 0.0);
        Ok(PitchEstimate::unvoiced())
    }
}

/// Pitch detection based on the YIN algorithm.
impl<S: Sample, T: TraceSink<S>> PitchTracker<S> for YinTracker<S, T> {
    fn estimate_pitch(&mut self, window: &VecDeque<S>) -> Result<PitchEstimate> {
        self.voiced = false;
        let DetectorInternals {
            window_length,
            max_lags,
            size,
            ..
        } = self.internals;
        if window.len() < size {
            return Err(Error::WindowTooShort {
                required: size,
                actual: window.len(),
            });
        }

        let buffers = &self.internals.buffers;
        let mut signal_ref = buffers.get_real_buffer();
        let signal = &mut signal_ref[..size];
        newest_first(window, signal);
        if let Some(fault) = first_fault(signal.iter()) {
            return Err(Error::Numeric(fault));
        }

        // STEP 1: Silence. Not enough energy to carry a pitch.
        let threshold = S::from_f64(self.config.threshold);
        let r0 = inner_product(&signal[..window_length], &signal[..window_length]);
        if let Some(fault) = r0.fault() {
            return Err(Error::Numeric(fault));
        }
        if r0 < threshold {
            drop(signal_ref);
            trace!("yin: r(0) = {} below threshold", r0);
            return self.unvoiced();
        }

        let (mut difference_ref, mut dc_ref, mut normalized_ref) = (
            buffers.get_real_buffer(),
            buffers.get_real_buffer(),
            buffers.get_real_buffer(),
        );
        let difference = &mut difference_ref[..=max_lags];
        let dc_correction = &mut dc_ref[..=max_lags];
        let normalized = &mut normalized_ref[..=max_lags];

        // STEP 2: With an FFT, the difference function for every lag up front.
        let mut wide_refs = None;
        if let Some(correlator) = self.internals.correlator.as_ref() {
            let (mut wide_difference, mut wide_dc) =
                (buffers.get_wide_buffer(), buffers.get_wide_buffer());
            let wide_correction = if self.config.remove_dc {
                Some(&mut wide_dc[..=max_lags])
            } else {
                None
            };
            windowed_square_error(
                signal,
                window_length,
                correlator,
                buffers,
                &mut wide_difference[..=max_lags],
                wide_correction,
            );
            wide_refs = Some((wide_difference, wide_dc));
        }

        let dc0 = sum(&signal[..window_length]);
        let full_range = self.trace.full_lag_range();
        difference[0] = S::zero();
        dc_correction[0] = S::zero();
        normalized[0] = S::one();
        let mut running_sum = S::zero();
        let mut found: Option<Point<f64>> = None;
        let mut last_lag = max_lags;

        for lag in 1..=max_lags {
            // STEP 2: Difference function, less the DC bias.
            let (d, correction) = match &wide_refs {
                Some((wide_difference, wide_dc)) => (
                    S::from_f64(wide_difference[lag]),
                    if self.config.remove_dc {
                        S::from_f64(wide_dc[lag])
                    } else {
                        S::zero()
                    },
                ),
                None => (
                    difference_at(signal, window_length, lag, r0),
                    if self.config.remove_dc {
                        dc_correction_at(signal, window_length, lag, dc0)
                    } else {
                        S::zero()
                    },
                ),
            };
            let d = if self.config.remove_dc { d - correction } else { d };
            difference[lag] = d;
            dc_correction[lag] = correction;

            // STEP 3: Cumulative mean normalized difference.
            let (cd, sum) = yin_normalize_at(d, lag, running_sum);
            normalized[lag] = cd;
            running_sum = sum;

            // STEP 4: The first local minimum, refined by a parabola, below the threshold.
            if found.is_none() && lag >= 2 {
                found = self.accept_minimum(normalized, lag);
                if found.is_some() && !full_range {
                    last_lag = lag;
                    break;
                }
            }
        }

        let fault = running_sum
            .fault()
            .or_else(|| first_fault(normalized[..=last_lag].iter()));
        self.trace.lag_functions(
            &difference[..=last_lag],
            &dc_correction[..=last_lag],
            &normalized[..=last_lag],
        );
        if let Some(fault) = fault {
            return Err(Error::Numeric(fault));
        }

        drop((signal_ref, difference_ref, dc_ref, normalized_ref, wide_refs));
        match found {
            Some(vertex) => {
                let frequency = (self.sample_rate / vertex.x) as f32;
                trace!(
                    "yin: {} Hz at lag {:.3}, d' = {:.4}",
                    frequency,
                    vertex.x,
                    vertex.y
                );
                self.voiced = true;
                self.trace.pitch(frequency, vertex.y);
                Ok(PitchEstimate::voiced(frequency))
            }
            None => {
                trace!("yin: no minimum below {}", self.config.threshold);
                self.unvoiced()
            }
        }
    }

    fn voiced(&self) -> bool {
        self.voiced
    }
}

impl<S: Sample, T: TraceSink<S>> YinTracker<S, T> {
    /// Check for a local minimum at `lag - 1` and return the parabola vertex
    /// if it lies below the threshold.
    fn accept_minimum(&self, normalized: &[S], lag: usize) -> Option<Point<f64>> {
        let (left, center, right) = (normalized[lag - 2], normalized[lag - 1], normalized[lag]);
        if left == S::zero() || right == S::zero() || left < center || right < center {
            return None;
        }
        let point = |x: usize, y: S| Point {
            x: S::from_usize(x),
            y,
        };
        // Collinear points have no vertex; keep searching.
        let parabola = newton_parabola(
            point(lag - 2, left),
            point(lag - 1, center),
            point(lag, right),
        )?;
        if parabola.fault().is_some() {
            return None;
        }
        let vertex = parabola.to_f64().vertex();
        (vertex.y < self.config.threshold).then_some(vertex)
    }
}
