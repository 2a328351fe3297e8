//! Optional diagnostic sink for the pipeline's intermediate values.
//!
//! Sinks observe, they never change results. [NoTrace] compiles to nothing.
use crate::sample::Sample;

/// Why the pre-processor reset its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    Overrun,
    Underrun,
}

pub trait TraceSink<S: Sample> {
    /// One retained sample at each pre-processing stage. Disabled stages pass
    /// their input through.
    fn preprocessed(&mut self, _raw: S, _low_passed: S, _high_passed: S, _output: S) {}

    fn stream_reset(&mut self, _reason: ResetReason) {}

    /// Per-lag difference function, DC correction and cumulative mean
    /// normalized difference of one estimate. Lag 0 is included.
    fn lag_functions(&mut self, _difference: &[S], _dc_correction: &[S], _normalized: &[S]) {}

    /// The estimate and the interpolated minimum it was accepted with
    /// (0 for unvoiced frames).
    fn pitch(&mut self, _frequency: f32, _minimum: f64) {}

    /// Keep evaluating lags after the estimate is accepted, so that
    /// [lag_functions](TraceSink::lag_functions) sees the whole range.
    fn full_lag_range(&self) -> bool {
        false
    }
}

/// The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl<S: Sample> TraceSink<S> for NoTrace {}

impl<S: Sample, T: TraceSink<S>> TraceSink<S> for &mut T {
    fn preprocessed(&mut self, raw: S, low_passed: S, high_passed: S, output: S) {
        (**self).preprocessed(raw, low_passed, high_passed, output)
    }
    fn stream_reset(&mut self, reason: ResetReason) {
        (**self).stream_reset(reason)
    }
    fn lag_functions(&mut self, difference: &[S], dc_correction: &[S], normalized: &[S]) {
        (**self).lag_functions(difference, dc_correction, normalized)
    }
    fn pitch(&mut self, frequency: f32, minimum: f64) {
        (**self).pitch(frequency, minimum)
    }
    fn full_lag_range(&self) -> bool {
        (**self).full_lag_range()
    }
}

/// Keeps everything in memory.
#[derive(Debug, Clone)]
pub struct RecordingTrace<S> {
    pub raw: Vec<S>,
    pub low_passed: Vec<S>,
    pub high_passed: Vec<S>,
    pub output: Vec<S>,
    pub resets: Vec<ResetReason>,
    pub difference: Vec<Vec<S>>,
    pub dc_correction: Vec<Vec<S>>,
    pub normalized: Vec<Vec<S>>,
    pub pitches: Vec<(f32, f64)>,
}

impl<S> Default for RecordingTrace<S> {
    fn default() -> Self {
        RecordingTrace {
            raw: Vec::new(),
            low_passed: Vec::new(),
            high_passed: Vec::new(),
            output: Vec::new(),
            resets: Vec::new(),
            difference: Vec::new(),
            dc_correction: Vec::new(),
            normalized: Vec::new(),
            pitches: Vec::new(),
        }
    }
}

impl<S: Sample> TraceSink<S> for RecordingTrace<S> {
    fn preprocessed(&mut self, raw: S, low_passed: S, high_passed: S, output: S) {
        self.raw.push(raw);
        self.low_passed.push(low_passed);
        self.high_passed.push(high_passed);
        self.output.push(output);
    }

    fn stream_reset(&mut self, reason: ResetReason) {
        self.resets.push(reason);
    }

    fn lag_functions(&mut self, difference: &[S], dc_correction: &[S], normalized: &[S]) {
        self.difference.push(difference.to_vec());
        self.dc_correction.push(dc_correction.to_vec());
        self.normalized.push(normalized.to_vec());
    }

    fn pitch(&mut self, frequency: f32, minimum: f64) {
        self.pitches.push((frequency, minimum));
    }

    fn full_lag_range(&self) -> bool {
        true
    }
}
