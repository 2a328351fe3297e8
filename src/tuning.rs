//! Equal-tempered tuner readings for pitch estimates.
use std::fmt;

use crate::detector::PitchEstimate;
use crate::error::{Error, Result};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
/// Position of A in [NOTE_NAMES].
const A_INDEX: i32 = 9;

/// Reference pitch for the equal-tempered scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    a4: f64,
}

/// Nearest note to a pitch and the pitch's deviation from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningReading {
    pub note: &'static str,
    pub octave: i32,
    /// Frequency of the nearest note in Hz.
    pub nominal_frequency: f64,
    /// Positive when sharp.
    pub cents: f64,
}

impl fmt::Display for TuningReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:+.1} cents", self.note, self.octave, self.cents)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning { a4: 440.0 }
    }
}

impl Tuning {
    pub fn new(a4: f64) -> Result<Self> {
        if a4.is_finite() && a4 > 0.0 {
            Ok(Tuning { a4 })
        } else {
            Err(Error::InvalidConfig(format!("A4 must be positive, got {}", a4)))
        }
    }

    pub fn a4(&self) -> f64 {
        self.a4
    }

    /// `None` for unvoiced estimates.
    pub fn reading(&self, estimate: &PitchEstimate) -> Option<TuningReading> {
        let frequency = estimate.frequency as f64;
        if !estimate.voiced || !(frequency > 0.0) {
            return None;
        }
        let semitones = (12.0 * (frequency / self.a4).log2()).round() as i32;
        let nominal_frequency = self.a4 * 2f64.powf(semitones as f64 / 12.0);
        let from_c4 = semitones + A_INDEX;
        Some(TuningReading {
            note: NOTE_NAMES[from_c4.rem_euclid(12) as usize],
            octave: 4 + from_c4.div_euclid(12),
            nominal_frequency,
            cents: 1200.0 * (frequency / nominal_frequency).log2(),
        })
    }
}
