//! # Pitch Tracker
//! *pitch_tracker* estimates the fundamental frequency of a live audio stream.
//! Samples are pulled from an [InputSource][source::InputSource], conditioned
//! by a [PreProcessor][preprocessor::PreProcessor] and handed to a
//! [YinTracker][detector::YinTracker] one sliding window at a time.
//!
//! # Pipeline
//!   * Channel selection and a 4th order Butterworth low-pass filter at the source rate
//!   * Decimation by [sub_sample][config::PreProcessorConfig::sub_sample]
//!   * An optional Butterworth high-pass filter ([HighPassKind][config::HighPassKind])
//!   * Optional [automatic gain control][filter::AutomaticGainControl]
//!   * The YIN estimator, with direct or FFT correlation
//!
//! Every stage is generic over [Sample], so the same pipeline runs in `f32`,
//! `f64` or 16-bit [fixed point][sample::Fixed].
//!
//! # Examples
//! ```
//! use pitch_tracker::config::{PreProcessorConfig, YinConfig};
//! use pitch_tracker::detector::{PitchTracker, YinTracker};
//! use pitch_tracker::preprocessor::PreProcessor;
//! use pitch_tracker::source::MemorySource;
//!
//! fn main() -> pitch_tracker::Result<()> {
//!     const SAMPLE_RATE: usize = 8000;
//!
//!     // One second of a 220 Hz tone from some source (microphone, file, etc...)
//!     let dt = 1.0 / SAMPLE_RATE as f64;
//!     let signal: Vec<f64> = (0..SAMPLE_RATE)
//!         .map(|n| 0.5 * (2.0 * std::f64::consts::PI * 220.0 * n as f64 * dt).sin())
//!         .collect();
//!     let mut source = MemorySource::from_signal(SAMPLE_RATE, &signal);
//!
//!     let mut pre = PreProcessor::<f64>::for_source(PreProcessorConfig::default(), &source)?;
//!     let mut tracker = YinTracker::from_preprocessor(&pre, YinConfig::default())?;
//!
//!     for _ in 0..50 {
//!         let window = pre.read(&mut source)?;
//!         let pitch = tracker.estimate_pitch(window)?;
//!         if pitch.voiced {
//!             println!("Frequency: {}", pitch.frequency);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub use detector::{PitchEstimate, PitchTracker};
pub use error::{Error, Result};
pub use sample::{NumericFault, Sample};

pub mod config;
pub mod detector;
pub mod error;
pub mod filter;
pub mod preprocessor;
pub mod sample;
pub mod source;
pub mod trace;
pub mod tuning;
pub mod utils;
