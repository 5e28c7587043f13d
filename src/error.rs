//! Error types.
//!
//! Nothing in the recording pipeline fails: noisy input is rejected through
//! [`FixDecision`](crate::FixDecision) and misused commands are no-ops. The
//! only fallible surface is configuration.

use thiserror::Error;

/// Reasons a [`TrackerConfig`](crate::TrackerConfig) is refused.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum ConfigError {
    #[error("stride length must be positive and finite, got {value}")]
    InvalidStrideLength { value: f64 },

    #[error("smoothing factor must be within [0, 1), got {value}")]
    InvalidSmoothing { value: f32 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: String, value: f64 },

    #[error("distance window is inverted: min {min} m > max {max} m")]
    InvertedDistanceWindow { min: f64, max: f64 },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse { reason: err.to_string() }
    }
}
