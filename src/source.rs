//! The streaming sample source consumed by the pre-processor.
use crate::sample::Sample;

/// A stream of interleaved frames, e.g. a capture device or a decoded file.
pub trait InputSource<S: Sample> {
    /// Append up to `frames` samples of `channel` to `buffer` and return how many
    /// were appended. Fewer than `frames` means end of data or an underrun.
    fn read(&mut self, buffer: &mut Vec<S>, frames: usize, channel: usize) -> usize;

    fn end_of_source(&self) -> bool;

    /// Frames were lost since the last [clear](InputSource::clear).
    fn overrun(&self) -> bool;

    /// Reset the overrun and underrun state and drop any buffered frames.
    fn clear(&mut self);

    fn frames_per_second(&self) -> usize;

    fn samples_per_frame(&self) -> usize;
}

/// Interleaved 16-bit device frames held in memory.
///
/// Overruns and underruns can be injected to exercise the recovery paths of
/// a consumer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    frames_per_second: usize,
    samples_per_frame: usize,
    data: Vec<i16>,
    position: usize,
    overrun: bool,
    underrun: bool,
}

impl MemorySource {
    /// `data` is interleaved; a trailing partial frame is ignored.
    pub fn new(frames_per_second: usize, samples_per_frame: usize, data: Vec<i16>) -> Self {
        MemorySource {
            frames_per_second,
            samples_per_frame,
            data,
            position: 0,
            overrun: false,
            underrun: false,
        }
    }

    /// A mono source from samples in `[-1, 1)`.
    pub fn from_signal(frames_per_second: usize, signal: &[f64]) -> Self {
        let data = signal.iter().map(|&x| x.to_device()).collect();
        MemorySource::new(frames_per_second, 1, data)
    }

    pub fn frames(&self) -> usize {
        if self.samples_per_frame == 0 {
            0
        } else {
            self.data.len() / self.samples_per_frame
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames() - self.position
    }

    /// Flag an overrun, as a device does when the reader falls behind.
    pub fn inject_overrun(&mut self) {
        self.overrun = true;
    }

    /// Make the next read come up empty while data remains.
    pub fn inject_underrun(&mut self) {
        self.underrun = true;
    }
}

impl<S: Sample> InputSource<S> for MemorySource {
    fn read(&mut self, buffer: &mut Vec<S>, frames: usize, channel: usize) -> usize {
        if self.underrun || channel >= self.samples_per_frame {
            return 0;
        }
        let count = frames.min(self.remaining());
        if count == 0 {
            return 0;
        }
        let start = self.position * self.samples_per_frame + channel;
        buffer.extend(
            self.data[start..]
                .iter()
                .step_by(self.samples_per_frame)
                .take(count)
                .map(|&v| S::from_device(v)),
        );
        self.position += count;
        count
    }

    fn end_of_source(&self) -> bool {
        self.remaining() == 0
    }

    fn overrun(&self) -> bool {
        self.overrun
    }

    fn clear(&mut self) {
        self.overrun = false;
        self.underrun = false;
    }

    fn frames_per_second(&self) -> usize {
        self.frames_per_second
    }

    fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }
}
