//! Tunable thresholds for step estimation and track filtering.
//!
//! Every default reproduces the behavior the platform screens were tuned
//! against; most callers should use [`TrackerConfig::default`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Standard gravity in m/s², as reported by Android's `SensorManager.GRAVITY_EARTH`.
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Configuration for the step estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StepConfig {
    /// Assumed distance covered per step.
    /// Default: 0.7 meters
    pub stride_length_m: f64,

    /// Minimum gap between two accepted step-detector events.
    /// Events closer than this are treated as duplicate firings.
    /// Default: 1000 ms
    pub debounce_ms: i64,

    /// Weight of the previous filtered value in the accelerometer low-pass
    /// filter (`filtered = alpha * previous + (1 - alpha) * sample`).
    /// Default: 0.8
    pub smoothing_alpha: f32,

    /// Filtered acceleration above which the user is considered moving.
    /// Default: 0.1 m/s²
    pub movement_threshold: f32,

    /// Filtered acceleration whose rising edge counts as one step.
    /// Default: 1.0 m/s²
    pub step_threshold: f32,

    /// Gravity subtracted from the raw acceleration magnitude.
    /// Default: 9.80665 m/s²
    pub gravity: f32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            stride_length_m: 0.7,
            debounce_ms: 1000,
            smoothing_alpha: 0.8,
            movement_threshold: 0.1,
            step_threshold: 1.0,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Configuration for the GPS track filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TrackFilterConfig {
    /// Fixes reporting a worse horizontal accuracy are discarded outright.
    /// Default: 30.0 meters
    pub max_accuracy_m: f32,

    /// Moves shorter than this are stationary jitter.
    /// Default: 0.5 meters
    pub min_distance_m: f64,

    /// Moves longer than this between consecutive fixes are teleport jumps.
    /// Default: 5.0 meters
    pub max_distance_m: f64,

    /// Implied speed above which a fix is rejected.
    /// Default: 10.0 m/s
    pub max_speed_mps: f64,
}

impl Default for TrackFilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: 30.0,
            min_distance_m: 0.5,
            max_distance_m: 5.0,
            max_speed_mps: 10.0,
        }
    }
}

/// Complete tracker configuration.
///
/// # Example
/// ```
/// use walk_tracker::TrackerConfig;
///
/// let mut config = TrackerConfig::default();
/// config.step.stride_length_m = 0.75;
/// assert!(config.validate().is_ok());
///
/// config.track.min_distance_m = 10.0;
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TrackerConfig {
    pub step: StepConfig,
    pub track: TrackFilterConfig,
    /// Elapsed time added per tick while recording.
    /// Default: 1000 ms
    pub tick_interval_ms: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step: StepConfig::default(),
            track: TrackFilterConfig::default(),
            tick_interval_ms: 1000,
        }
    }
}

impl TrackerConfig {
    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = &self.step;
        if !(step.stride_length_m.is_finite() && step.stride_length_m > 0.0) {
            return Err(ConfigError::InvalidStrideLength { value: step.stride_length_m });
        }
        if !(0.0..1.0).contains(&step.smoothing_alpha) {
            return Err(ConfigError::InvalidSmoothing { value: step.smoothing_alpha });
        }
        positive("debounce_ms", step.debounce_ms as f64)?;
        positive("step_threshold", step.step_threshold as f64)?;
        positive("movement_threshold", step.movement_threshold as f64)?;
        positive("gravity", step.gravity as f64)?;

        let track = &self.track;
        positive("max_accuracy_m", track.max_accuracy_m as f64)?;
        positive("min_distance_m", track.min_distance_m)?;
        positive("max_distance_m", track.max_distance_m)?;
        positive("max_speed_mps", track.max_speed_mps)?;
        if track.min_distance_m > track.max_distance_m {
            return Err(ConfigError::InvertedDistanceWindow {
                min: track.min_distance_m,
                max: track.max_distance_m,
            });
        }

        positive("tick_interval_ms", self.tick_interval_ms as f64)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// ```
    /// use walk_tracker::TrackerConfig;
    ///
    /// let config = TrackerConfig::from_json(r#"{"step": {"stride_length_m": 0.8}}"#).unwrap();
    /// assert_eq!(config.step.stride_length_m, 0.8);
    /// assert_eq!(config.track.max_accuracy_m, 30.0);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name: name.to_string(), value })
    }
}
