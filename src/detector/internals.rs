use std::collections::VecDeque;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner};

use crate::config::Correlation;
use crate::sample::Sample;
use crate::utils::buffer::{
    copy_complex_to_real, copy_real_to_complex, inner_product, sum, BufferPool,
};

/// Data structure to hold any buffers needed for pitch computation.
/// Buffers are allocated once and handed out by a `BufferPool` rather than
/// allocated and freed on every estimate.
pub struct DetectorInternals<S: Sample> {
    pub window_length: usize,
    pub max_lags: usize,
    /// `window_length + max_lags + 1`
    pub size: usize,
    pub buffers: BufferPool<S>,
    pub correlator: Option<FftCorrelator>,
}

impl<S: Sample> DetectorInternals<S> {
    pub fn new(window_length: usize, max_lags: usize, correlation: Correlation) -> Self {
        let size = window_length + max_lags + 1;
        let correlator = match correlation {
            Correlation::Direct => None,
            Correlation::Fft => Some(FftCorrelator::new(size)),
        };
        let buffer_size = correlator
            .as_ref()
            .map_or(size, |c| c.buffer_len().max(size));

        DetectorInternals {
            window_length,
            max_lags,
            size,
            buffers: BufferPool::new(buffer_size),
            correlator,
        }
    }
}

/// Copy the newest `result.len()` samples of `window` into `result`, newest first.
pub fn newest_first<S: Sample>(window: &VecDeque<S>, result: &mut [S]) {
    assert!(window.len() >= result.len());
    window
        .iter()
        .rev()
        .zip(result.iter_mut())
        .for_each(|(&w, r)| *r = w);
}

/// The YIN difference function at `lag`,
///
/// > d(t) = r(0) + r_t(0) - 2·r(t)
///
/// where `r(t)` correlates the first `window_size` samples of `signal` with
/// the same span shifted by `t`, and `r_t(0)` is the energy of the shifted span.
pub fn difference_at<S: Sample>(signal: &[S], window_size: usize, lag: usize, r0: S) -> S {
    let current = &signal[..window_size];
    let lagged = &signal[lag..lag + window_size];
    let r0t = inner_product(lagged, lagged);
    let rt = inner_product(current, lagged);
    r0 + r0t - S::from_i16(2) * rt
}

/// Bias of the difference function at `lag` caused by a DC offset,
///
/// > (sum(x_0..x_w) - sum(x_t..x_{t+w}))² / w
///
/// with `dc0` the sum over the unshifted span.
pub fn dc_correction_at<S: Sample>(signal: &[S], window_size: usize, lag: usize, dc0: S) -> S {
    let offset = dc0 - sum(&signal[lag..lag + window_size]);
    offset * offset / S::from_usize(window_size)
}

/// Cross-correlation by FFT, planned once for a fixed signal length.
pub struct FftCorrelator {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch_len: usize,
}

impl FftCorrelator {
    /// Plan for signals of up to `signal_len` samples. The transform length is
    /// the next power of two.
    pub fn new(signal_len: usize) -> Self {
        let len = signal_len.next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        FftCorrelator {
            len,
            forward,
            inverse,
            scratch_len,
        }
    }

    /// Complex buffers handed to [windowed_autocorrelation](Self::windowed_autocorrelation)
    /// must be at least this long.
    pub fn buffer_len(&self) -> usize {
        self.len.max(self.scratch_len)
    }

    /// Compute the windowed autocorrelation of `signal` and put the result in `result`.
    /// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
    /// the function
    ///
    /// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
    ///
    /// `result.len()` must not exceed `signal.len() - window_size + 1`.
    pub fn windowed_autocorrelation<S: Sample>(
        &self,
        signal: &[S],
        window_size: usize,
        buffers: &BufferPool<S>,
        result: &mut [f64],
    ) {
        assert!(signal.len() <= self.len);
        assert!(result.len() + window_size <= signal.len() + 1);
        assert!(buffers.buffer_size >= self.buffer_len());

        let (mut ref1, mut ref2, mut ref3) = (
            buffers.get_complex_buffer(),
            buffers.get_complex_buffer(),
            buffers.get_complex_buffer(),
        );
        let signal_complex = &mut ref1[..self.len];
        let truncated_signal_complex = &mut ref2[..self.len];
        let scratch = &mut ref3[..self.scratch_len];

        // Cross-correlate the signal with itself truncated to `0..window_size`.
        // Zero padding to `len` keeps the circular correlation from wrapping.
        copy_real_to_complex(signal, signal_complex);
        copy_real_to_complex(&signal[..window_size], truncated_signal_complex);
        self.forward.process_with_scratch(signal_complex, scratch);
        self.forward
            .process_with_scratch(truncated_signal_complex, scratch);
        // rustfft doesn't normalize, so divide by `len` once for the forward and
        // inverse transforms together.
        let normalization_const = 1.0 / self.len as f64;
        signal_complex
            .iter_mut()
            .zip(truncated_signal_complex.iter())
            .for_each(|(a, b)| {
                *a = *a * normalization_const * b.conj();
            });
        self.inverse.process_with_scratch(signal_complex, scratch);

        copy_complex_to_real(signal_complex, result);
    }
}

/// The difference function for lags `0..difference.len()` computed in `f64`,
/// with the autocorrelation taken by FFT and the lagged energies updated
/// incrementally. When `dc_correction` is given it receives the DC bias for
/// every lag, and it is not subtracted from `difference`.
pub fn windowed_square_error<S: Sample>(
    signal: &[S],
    window_size: usize,
    correlator: &FftCorrelator,
    buffers: &BufferPool<S>,
    difference: &mut [f64],
    dc_correction: Option<&mut [f64]>,
) {
    correlator.windowed_autocorrelation(signal, window_size, buffers, difference);

    let x = |i: usize| signal[i].to_f64();
    let power = (0..window_size).map(|i| x(i) * x(i)).sum::<f64>();
    let mut windowed_power = power;
    difference.iter_mut().enumerate().for_each(|(t, a)| {
        *a = power + windowed_power - 2.0 * *a;
        // Slide the lagged window one sample by adding and removing the
        // boundary terms.
        if t + window_size < signal.len() {
            windowed_power = windowed_power - x(t) * x(t) + x(t + window_size) * x(t + window_size);
        }
    });

    if let Some(dc_correction) = dc_correction {
        let total = (0..window_size).map(x).sum::<f64>();
        let mut windowed_sum = total;
        let width = window_size as f64;
        dc_correction.iter_mut().enumerate().for_each(|(t, c)| {
            let offset = total - windowed_sum;
            *c = offset * offset / width;
            if t + window_size < signal.len() {
                windowed_sum = windowed_sum - x(t) + x(t + window_size);
            }
        });
    }
}

/// Calculate the "cumulative mean normalized difference function" as
/// specified in the YIN paper. If _d(t)_ is the square error function,
/// compute _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) * t / sum_{i=1}^t d(i)
///
/// Returns the running sum after `lag`; a zero sum gives `d'(t) = 0`.
pub fn yin_normalize_at<S: Sample>(difference: S, lag: usize, running_sum: S) -> (S, S) {
    let running_sum = running_sum + difference;
    let normalized = if running_sum == S::zero() {
        S::zero()
    } else {
        difference * S::from_usize(lag) / running_sum
    };
    (normalized, running_sum)
}
