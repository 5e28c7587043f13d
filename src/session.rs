//! # Recording Session
//!
//! [`Tracker`] owns the single mutable [`SessionState`], the step estimator,
//! the track filter and the history of saved [`Record`]s. All mutation goes
//! through its command methods:
//!
//! ```text
//!            start / resume
//!   Idle  ───────────────────▶  Recording
//!    ▲  │                           │
//!    │  │ save / reset     pause    │
//!    └──┘ ◀────────────────────────-┘
//! ```
//!
//! Commands issued in the wrong state are ignored and return `false`.
//!
//! ## Example
//!
//! ```
//! use walk_tracker::{GeoFix, MotionSample, SensorCapabilities, Tracker};
//!
//! let caps = SensorCapabilities { has_step_detector: false, has_step_counter: true };
//! let mut tracker = Tracker::new(&caps);
//!
//! assert!(tracker.start());
//! tracker.on_fix(&GeoFix::new(0.0, 0.0, 5.0, 0));
//! tracker.on_motion(&MotionSample::StepCounter { total: 1000, timestamp_ms: 0 });
//! tracker.on_motion(&MotionSample::StepCounter { total: 1010, timestamp_ms: 5000 });
//! tracker.tick();
//!
//! assert!(tracker.pause());
//! let record = tracker.save().unwrap();
//! assert_eq!(record.step_count, 10);
//! assert_eq!(record.elapsed_ms, 1000);
//! assert_eq!(tracker.history().len(), 1);
//! ```

use log::{debug, info};

use crate::config::TrackerConfig;
use crate::error::ConfigError;
use crate::geo_utils::{compute_bounds, compute_center, polyline_length, simplify_path};
use crate::step_estimator::{MotionSample, SensorCapabilities, StepEstimator, StepStrategy};
use crate::track_filter::{FixDecision, TrackFilter};
use crate::{Bounds, GeoFix, PathPoint};

/// Whether the session is accruing time and accepting sensor input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum SessionPhase {
    Idle,
    Recording,
}

/// Live counters of the current recording.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SessionState {
    pub is_recording: bool,
    pub elapsed_ms: i64,
    pub step_count: u32,
    pub distance_meters: f64,
    /// Accepted points in arrival order
    pub path: Vec<PathPoint>,
    pub last_accepted_fix: Option<GeoFix>,
    pub last_accepted_timestamp: Option<i64>,
}

impl SessionState {
    /// Nothing has been recorded since the last start/save/reset.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.step_count == 0 && self.elapsed_ms == 0
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    fn clear(&mut self) {
        *self = SessionState { is_recording: self.is_recording, ..SessionState::default() };
    }
}

/// Immutable snapshot of a saved session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Record {
    /// Step-derived distance in kilometers
    pub distance_km: f64,
    pub elapsed_ms: i64,
    pub step_count: u32,
    pub path: Vec<PathPoint>,
}

impl Record {
    fn snapshot(state: &SessionState) -> Self {
        Self {
            distance_km: state.distance_km(),
            elapsed_ms: state.elapsed_ms,
            step_count: state.step_count,
            path: state.path.clone(),
        }
    }

    /// Bounding box of the path, for fitting the map camera.
    pub fn bounds(&self) -> Option<Bounds> {
        compute_bounds(&self.path)
    }

    pub fn center(&self) -> Option<PathPoint> {
        compute_center(&self.path)
    }

    /// Length of the polyline itself, independent of the step-derived distance.
    /// Includes the hops between segments of a resumed session.
    pub fn path_length_m(&self) -> f64 {
        polyline_length(&self.path)
    }

    /// Douglas-Peucker simplified path for list thumbnails.
    pub fn simplified_path(&self, tolerance_degrees: f64) -> Vec<PathPoint> {
        simplify_path(&self.path, tolerance_degrees)
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }
}

/// Format a duration in milliseconds as `HH:MM:SS`, truncating partial seconds.
///
/// ```
/// use walk_tracker::format_elapsed;
///
/// assert_eq!(format_elapsed(0), "00:00:00");
/// assert_eq!(format_elapsed(3_723_999), "01:02:03");
/// ```
pub fn format_elapsed(elapsed_ms: i64) -> String {
    let seconds = elapsed_ms.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

/// The recording screen's core: one session, its inputs and its history.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackerConfig,
    state: SessionState,
    estimator: StepEstimator,
    filter: TrackFilter,
    history: Vec<Record>,
    /// Bumped on every transition into Recording
    generation: u64,
}

impl Tracker {
    /// Create a tracker with the default configuration.
    pub fn new(capabilities: &SensorCapabilities) -> Self {
        Self::build(capabilities, TrackerConfig::default())
    }

    /// Create a tracker with a custom configuration.
    pub fn with_config(capabilities: &SensorCapabilities, config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(capabilities, config))
    }

    fn build(capabilities: &SensorCapabilities, config: TrackerConfig) -> Self {
        Self {
            estimator: StepEstimator::new(capabilities, config.step.clone()),
            filter: TrackFilter::new(config.track.clone()),
            state: SessionState::default(),
            history: Vec::new(),
            generation: 0,
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Begin a fresh recording. Only valid while idle; clears any unsaved session.
    pub fn start(&mut self) -> bool {
        if self.state.is_recording {
            debug!("[Session] start ignored: already recording");
            return false;
        }
        self.state.clear();
        self.enter_recording();
        info!("[Session] Recording started ({:?})", self.estimator.strategy());
        true
    }

    /// Continue a paused recording without clearing it.
    pub fn resume(&mut self) -> bool {
        if self.state.is_recording || self.state.is_empty() {
            debug!("[Session] resume ignored: nothing paused");
            return false;
        }
        self.enter_recording();
        info!(
            "[Session] Recording resumed at {} steps, {} points",
            self.state.step_count,
            self.state.path.len()
        );
        true
    }

    /// Stop accruing time and sensor input. Counters and path are kept.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_recording {
            debug!("[Session] pause ignored: not recording");
            return false;
        }
        self.state.is_recording = false;
        self.estimator.deactivate();
        self.filter.deactivate(&mut self.state);
        info!(
            "[Session] Paused at {} ({} steps, {} points)",
            format_elapsed(self.state.elapsed_ms),
            self.state.step_count,
            self.state.path.len()
        );
        true
    }

    /// Snapshot the paused session into history and clear it.
    ///
    /// Returns `None` while recording or when the path is empty.
    pub fn save(&mut self) -> Option<Record> {
        if self.state.is_recording || self.state.path.is_empty() {
            debug!("[Session] save ignored: recording or empty path");
            return None;
        }
        let record = Record::snapshot(&self.state);
        self.history.push(record.clone());
        self.state.clear();
        info!(
            "[Session] Saved record #{}: {:.2} km, {}, {} steps",
            self.history.len(),
            record.distance_km,
            record.elapsed_label(),
            record.step_count
        );
        Some(record)
    }

    /// Discard the paused session without saving it.
    pub fn reset(&mut self) -> bool {
        if self.state.is_recording {
            debug!("[Session] reset ignored: recording");
            return false;
        }
        self.state.clear();
        true
    }

    /// Add one tick of elapsed time while recording.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_recording {
            return false;
        }
        self.state.elapsed_ms += self.config.tick_interval_ms;
        true
    }

    // ------------------------------------------------------------------------
    // Sensor input
    // ------------------------------------------------------------------------

    /// Feed one motion sample. Returns `true` if the step count changed.
    pub fn on_motion(&mut self, sample: &MotionSample) -> bool {
        self.estimator.process(sample, &mut self.state)
    }

    /// Feed one location fix.
    pub fn on_fix(&mut self, fix: &GeoFix) -> FixDecision {
        self.filter.process(fix, &mut self.state)
    }

    // ------------------------------------------------------------------------
    // Observables
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        if self.state.is_recording {
            SessionPhase::Recording
        } else {
            SessionPhase::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.state.elapsed_ms
    }

    pub fn step_count(&self) -> u32 {
        self.state.step_count
    }

    pub fn distance_meters(&self) -> f64 {
        self.state.distance_meters
    }

    pub fn path(&self) -> &[PathPoint] {
        &self.state.path
    }

    /// Where the map camera should follow: the last accepted point of the
    /// current segment.
    pub fn camera_target(&self) -> Option<PathPoint> {
        self.state.last_accepted_fix.map(|fix| fix.point())
    }

    /// Only meaningful while recording; an idle tracker is never moving.
    pub fn is_moving(&self) -> bool {
        self.state.is_recording && self.estimator.is_moving()
    }

    /// Identifies the current recording run. Changes on every start/resume,
    /// so timers tied to an earlier run can tell they are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn strategy(&self) -> StepStrategy {
        self.estimator.strategy()
    }

    pub fn history(&self) -> &[Record] {
        &self.history
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn enter_recording(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state.is_recording = true;
        self.estimator.activate(self.state.step_count);
        self.filter.activate();
    }
}
