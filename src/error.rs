//! Error types for the pitch tracking pipeline.

use thiserror::Error;

use crate::sample::NumericFault;

/// Errors reported by the pre-processor and the pitch tracker.
///
/// Stream disruptions (overrun, underrun) are recovered inside
/// [`PreProcessor::read`](crate::preprocessor::PreProcessor::read) and never
/// show up here. An unvoiced frame is not an error either.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Window too short: need {required} samples, got {actual}")]
    WindowTooShort { required: usize, actual: usize },

    #[error("Numeric fault: {0}")]
    Numeric(NumericFault),
}

impl From<NumericFault> for Error {
    fn from(fault: NumericFault) -> Self {
        Error::Numeric(fault)
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = Error::WindowTooShort {
            required: 10,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Window too short: need 10 samples, got 3");

        let err: Error = NumericFault::Overflow.into();
        assert_eq!(err, Error::Numeric(NumericFault::Overflow));
        assert_eq!(err.to_string(), "Numeric fault: overflow");
    }
}
