use std::collections::VecDeque;

use crate::error::Result;
use crate::sample::Sample;

pub mod internals;
pub mod yin;

pub use crate::config::{Correlation, YinConfig};
pub use yin::YinTracker;

/// One pitch estimate. `frequency` is 0 when the frame is unvoiced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchEstimate {
    pub frequency: f32,
    pub voiced: bool,
}

impl PitchEstimate {
    pub fn voiced(frequency: f32) -> Self {
        PitchEstimate {
            frequency,
            voiced: true,
        }
    }

    pub fn unvoiced() -> Self {
        PitchEstimate {
            frequency: 0.0,
            voiced: false,
        }
    }
}

pub trait PitchTracker<S>
where
    S: Sample,
{
    /// Estimate the pitch of the newest samples in `window`.
    fn estimate_pitch(&mut self, window: &VecDeque<S>) -> Result<PitchEstimate>;

    /// Whether the last estimate was voiced.
    fn voiced(&self) -> bool;
}
