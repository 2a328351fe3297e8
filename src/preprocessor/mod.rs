//! Streaming pre-processing: channel selection, low-pass filtering with
//! decimation, optional high-pass filtering and gain control, and the sliding
//! window handed to the tracker.
//!
//! Every call to [PreProcessor::read] either returns a full window of
//! [output_size](PreProcessor::output_size) samples, updated by one interval,
//! or, after an overrun or underrun, a window of the same size holding only
//! zeros.
use std::collections::VecDeque;

use log::{debug, warn};

use crate::config::{FrameSizes, PreProcessorConfig};
use crate::error::{Error, Result};
use crate::filter::{AutomaticGainControl, ButterworthLowPass4, Filter, HighPass};
use crate::sample::Sample;
use crate::source::InputSource;
use crate::trace::{NoTrace, ResetReason, TraceSink};

pub struct PreProcessor<S: Sample, T: TraceSink<S> = NoTrace> {
    config: PreProcessorConfig,
    sizes: FrameSizes,
    low_pass: ButterworthLowPass4<S>,
    high_pass: Option<HighPass<S>>,
    agc: Option<AutomaticGainControl<S>>,
    window: VecDeque<S>,
    raw: Vec<S>,
    resets: usize,
    trace: T,
}

impl<S: Sample> PreProcessor<S> {
    pub fn new(
        config: PreProcessorConfig,
        sample_rate: usize,
        samples_per_frame: usize,
    ) -> Result<Self> {
        Self::with_trace(config, sample_rate, samples_per_frame, NoTrace)
    }

    /// Size the pre-processor for the rate and frame layout of `source`.
    pub fn for_source<Src>(config: PreProcessorConfig, source: &Src) -> Result<Self>
    where
        Src: InputSource<S> + ?Sized,
    {
        Self::new(
            config,
            source.frames_per_second(),
            source.samples_per_frame(),
        )
    }
}

impl<S: Sample, T: TraceSink<S>> PreProcessor<S, T> {
    pub fn with_trace(
        config: PreProcessorConfig,
        sample_rate: usize,
        samples_per_frame: usize,
        trace: T,
    ) -> Result<Self> {
        config.validate(sample_rate, samples_per_frame)?;
        let sizes = config.frame_sizes(sample_rate);
        let sub_sample_rate = sizes.sub_sample_rate as f64;

        let low_pass = ButterworthLowPass4::new(config.low_pass_cutoff, sample_rate as f64);
        let high_pass = config.enable_high_pass.then(|| {
            HighPass::new(
                config.high_pass_kind,
                config.high_pass_cutoff,
                sub_sample_rate,
            )
        });
        let agc = config
            .enable_agc
            .then(|| AutomaticGainControl::new(&config.agc, sub_sample_rate));

        debug!(
            "pre-processor at {} Hz, sub-sample {}: {:?}",
            sample_rate, config.sub_sample, sizes
        );

        Ok(PreProcessor {
            config,
            sizes,
            low_pass,
            high_pass,
            agc,
            window: VecDeque::with_capacity(sizes.output_size + sizes.sub_sampled_interval),
            raw: Vec::with_capacity(sizes.sample_interval),
            resets: 0,
            trace,
        })
    }

    /// Advance the window by one interval of source frames.
    ///
    /// Stream disruptions are recovered here: the source is cleared and the
    /// window comes back zeroed. The only error is a numeric fault raised by a
    /// fixed-point policy, after which the pre-processor should be
    /// [reset](PreProcessor::reset).
    pub fn read<Src>(&mut self, source: &mut Src) -> Result<&VecDeque<S>>
    where
        Src: InputSource<S> + ?Sized,
    {
        if source.overrun() {
            return Ok(self.restart(source, ResetReason::Overrun));
        }

        let interval = self.sizes.sub_sampled_interval;
        if self.window.len() >= interval {
            self.window.drain(..interval);
        } else {
            self.window.clear();
        }

        while self.window.len() < self.sizes.output_size {
            self.raw.clear();
            let wanted = self.sizes.sample_interval;
            let got = source.read(&mut self.raw, wanted, self.config.channel);
            if got < wanted {
                if !source.end_of_source() {
                    return Ok(self.restart(source, ResetReason::Underrun));
                }
                self.raw.resize(wanted, S::zero());
            }
            self.raw.truncate(wanted);
            self.filter_block()?;
        }

        let excess = self.window.len() - self.sizes.output_size;
        self.window.drain(..excess);
        Ok(&self.window)
    }

    /// Filter, decimate and append the frames in `self.raw`.
    fn filter_block(&mut self) -> Result<()> {
        let PreProcessor {
            config,
            low_pass,
            high_pass,
            agc,
            window,
            raw,
            trace,
            ..
        } = self;

        for group in raw.chunks(config.sub_sample) {
            let mut last = (S::zero(), S::zero());
            for &x in group {
                last = (x, low_pass.process(x));
            }
            let (raw_sample, low_passed) = last;
            let high_passed = match high_pass {
                Some(filter) => filter.process(low_passed),
                None => low_passed,
            };
            let output = match agc {
                Some(agc) => agc.process(high_passed),
                None => high_passed,
            };
            trace.preprocessed(raw_sample, low_passed, high_passed, output);
            if let Some(fault) = output.fault() {
                return Err(Error::Numeric(fault));
            }
            window.push_back(output);
        }
        Ok(())
    }

    fn restart<Src>(&mut self, source: &mut Src, reason: ResetReason) -> &VecDeque<S>
    where
        Src: InputSource<S> + ?Sized,
    {
        source.clear();
        self.window.clear();
        self.window.resize(self.sizes.output_size, S::zero());
        self.resets += 1;
        warn!("{:?}: window reset to {} zeros", reason, self.sizes.output_size);
        self.trace.stream_reset(reason);
        &self.window
    }

    /// Clear the window and zero every filter and the gain control.
    pub fn reset(&mut self) {
        self.window.clear();
        self.low_pass.reset();
        if let Some(filter) = self.high_pass.as_mut() {
            filter.reset();
        }
        if let Some(agc) = self.agc.as_mut() {
            agc.reset();
        }
    }

    pub fn config(&self) -> &PreProcessorConfig {
        &self.config
    }

    /// Sample rate after decimation; the tracker runs at this rate.
    pub fn sub_sample_rate(&self) -> usize {
        self.sizes.sub_sample_rate
    }

    pub fn window_length(&self) -> usize {
        self.sizes.window_length
    }

    pub fn max_lags(&self) -> usize {
        self.sizes.max_lags
    }

    pub fn output_size(&self) -> usize {
        self.sizes.output_size
    }

    /// Source frames consumed per read.
    pub fn sample_interval(&self) -> usize {
        self.sizes.sample_interval
    }

    /// Window samples replaced per read.
    pub fn sub_sampled_interval(&self) -> usize {
        self.sizes.sub_sampled_interval
    }

    pub fn window(&self) -> &VecDeque<S> {
        &self.window
    }

    /// Number of overrun and underrun recoveries so far.
    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn agc(&self) -> Option<&AutomaticGainControl<S>> {
        self.agc.as_ref()
    }

    pub fn trace(&self) -> &T {
        &self.trace
    }

    pub fn into_trace(self) -> T {
        self.trace
    }
}
