//! # Walk Tracker
//!
//! Sensor fusion and track filtering core for a mobile walk-recording screen.
//!
//! This library provides:
//! - Step counting from a step-detector, step-counter or raw accelerometer,
//!   whichever the device offers
//! - GPS fix filtering that rejects imprecise fixes, stationary jitter and
//!   teleport jumps
//! - A start/pause/save session state machine with an in-memory history
//!
//! The screen itself (map widget, permission prompts, lists) stays on the
//! platform side; it feeds sensor events in and renders the outputs.
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`runtime`** - Enable the tokio elapsed-time ticker
//! - **`serde`** - Enable JSON configuration loading
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use walk_tracker::{GeoFix, MotionSample, SensorCapabilities, StepStrategy, Tracker};
//!
//! let caps = SensorCapabilities { has_step_detector: true, has_step_counter: true };
//! let mut tracker = Tracker::new(&caps);
//! assert_eq!(tracker.strategy(), StepStrategy::StepDetector);
//!
//! tracker.start();
//!
//! // Location provider, roughly once a second
//! tracker.on_fix(&GeoFix::new(0.0, 0.0, 5.0, 0));
//! tracker.on_fix(&GeoFix::new(0.00003, 0.0, 5.0, 1000));
//! assert_eq!(tracker.path().len(), 2);
//!
//! // Step detector events; the first one after start is dropped
//! tracker.on_motion(&MotionSample::StepDetector { timestamp_ms: 0 });
//! tracker.on_motion(&MotionSample::StepDetector { timestamp_ms: 500 });
//! assert_eq!(tracker.step_count(), 1);
//!
//! tracker.pause();
//! let record = tracker.save().unwrap();
//! assert_eq!(record.path.len(), 2);
//! ```

// Geographic helpers (haversine, bounds, simplification)
pub mod geo_utils;

pub mod config;
pub use config::{StepConfig, TrackFilterConfig, TrackerConfig, STANDARD_GRAVITY};

pub mod error;
pub use error::ConfigError;

// Step counting strategies
pub mod step_estimator;
pub use step_estimator::{
    MotionSample, SensorCapabilities, StepEstimator, StepEstimatorState, StepStrategy,
};

// GPS fix filtering
pub mod track_filter;
pub use track_filter::{evaluate_fix, FixDecision, RejectReason, TrackFilter};

// Session state machine
pub mod session;
pub use session::{format_elapsed, Record, SessionPhase, SessionState, Tracker};

// Async elapsed-time accrual
#[cfg(feature = "runtime")]
pub mod ticker;

#[cfg(feature = "runtime")]
pub use ticker::{spawn_ticker, SharedTracker};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("WalkTrackerRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A point on the recorded path.
///
/// # Example
/// ```
/// use walk_tracker::PathPoint;
/// let point = PathPoint::new(31.2304, 121.4737);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct PathPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl PathPoint {
    /// Create a new path point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One fix reported by the location provider.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters (larger = worse)
    pub accuracy: f32,
    /// Wall-clock time the fix was received, in milliseconds
    pub timestamp_ms: i64,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f32, timestamp_ms: i64) -> Self {
        Self { latitude, longitude, accuracy, timestamp_ms }
    }

    /// The fix reduced to its position.
    pub fn point(&self) -> PathPoint {
        PathPoint::new(self.latitude, self.longitude)
    }
}

/// Bounding box of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> PathPoint {
        PathPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// Tracker handle for Kotlin/Swift.
    ///
    /// Platform callbacks arrive on the UI thread, so the lock is never
    /// contended; it only exists because foreign objects must be `Sync`.
    #[derive(uniffi::Object)]
    pub struct WalkTracker {
        inner: Mutex<Tracker>,
    }

    impl WalkTracker {
        fn lock(&self) -> MutexGuard<'_, Tracker> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[uniffi::export]
    impl WalkTracker {
        /// Create a tracker with the default configuration.
        #[uniffi::constructor]
        pub fn new(capabilities: SensorCapabilities) -> Arc<Self> {
            init_logging();
            let tracker = Tracker::new(&capabilities);
            info!("[WalkTrackerRust] 🦀 Tracker created using {:?}", tracker.strategy());
            Arc::new(Self { inner: Mutex::new(tracker) })
        }

        /// Create a tracker with a custom configuration.
        #[uniffi::constructor]
        pub fn with_config(
            capabilities: SensorCapabilities,
            config: TrackerConfig,
        ) -> Result<Arc<Self>, ConfigError> {
            init_logging();
            let tracker = Tracker::with_config(&capabilities, config)?;
            info!("[WalkTrackerRust] 🦀 Tracker created with custom config using {:?}", tracker.strategy());
            Ok(Arc::new(Self { inner: Mutex::new(tracker) }))
        }

        pub fn start(&self) -> bool {
            self.lock().start()
        }

        pub fn pause(&self) -> bool {
            self.lock().pause()
        }

        pub fn resume(&self) -> bool {
            self.lock().resume()
        }

        pub fn save(&self) -> Option<Record> {
            self.lock().save()
        }

        pub fn reset(&self) -> bool {
            self.lock().reset()
        }

        pub fn tick(&self) -> bool {
            self.lock().tick()
        }

        pub fn on_motion(&self, sample: MotionSample) -> bool {
            self.lock().on_motion(&sample)
        }

        pub fn on_fix(&self, fix: GeoFix) -> FixDecision {
            self.lock().on_fix(&fix)
        }

        /// Copy of the live session for rendering.
        pub fn session(&self) -> SessionState {
            self.lock().state().clone()
        }

        pub fn phase(&self) -> SessionPhase {
            self.lock().phase()
        }

        pub fn strategy(&self) -> StepStrategy {
            self.lock().strategy()
        }

        pub fn is_moving(&self) -> bool {
            self.lock().is_moving()
        }

        pub fn camera_target(&self) -> Option<PathPoint> {
            self.lock().camera_target()
        }

        pub fn history(&self) -> Vec<Record> {
            self.lock().history().to_vec()
        }
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_tracker_config() -> TrackerConfig {
        init_logging();
        TrackerConfig::default()
    }

    /// Which strategy a device with these sensors would use.
    #[uniffi::export]
    pub fn select_strategy(capabilities: SensorCapabilities) -> StepStrategy {
        StepStrategy::select(&capabilities)
    }

    /// Bounding box of a saved record's path, for fitting the map camera.
    #[uniffi::export]
    pub fn record_bounds(record: Record) -> Option<Bounds> {
        record.bounds()
    }

    /// Simplified path of a saved record for list thumbnails.
    #[uniffi::export]
    pub fn record_thumbnail_path(record: Record, tolerance_degrees: f64) -> Vec<PathPoint> {
        record.simplified_path(tolerance_degrees)
    }

    #[uniffi::export]
    pub fn format_elapsed_label(elapsed_ms: i64) -> String {
        format_elapsed(elapsed_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
