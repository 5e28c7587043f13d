//! # Step Estimation
//!
//! Turns a raw motion-sensor stream into a monotonically increasing step count
//! using the best sensor the device offers.
//!
//! ## Strategies
//!
//! | Strategy | Sensor | Counting rule |
//! |----------|--------|---------------|
//! | [`StepStrategy::StepDetector`] | one event per step | first event after activation dropped, then debounced |
//! | [`StepStrategy::StepCounter`] | cumulative lifetime total | `total - baseline` |
//! | [`StepStrategy::AccelerometerFallback`] | raw x/y/z | rising edge of low-pass filtered magnitude |
//!
//! The strategy is chosen once from [`SensorCapabilities`] and never changes.
//! Each strategy is a standalone function over [`StepEstimatorState`];
//! [`StepEstimator`] only dispatches samples to the one that is active.

use log::{debug, info, warn};

use crate::config::StepConfig;
use crate::session::SessionState;

/// Which step sensors the platform reported at screen initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SensorCapabilities {
    pub has_step_detector: bool,
    pub has_step_counter: bool,
}

/// Step counting algorithm, fixed for the lifetime of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum StepStrategy {
    StepDetector,
    StepCounter,
    AccelerometerFallback,
}

impl StepStrategy {
    /// Pick the strategy for a device: detector, then counter, then accelerometer.
    ///
    /// # Example
    /// ```
    /// use walk_tracker::{SensorCapabilities, StepStrategy};
    ///
    /// let caps = SensorCapabilities { has_step_detector: false, has_step_counter: true };
    /// assert_eq!(StepStrategy::select(&caps), StepStrategy::StepCounter);
    /// ```
    pub fn select(capabilities: &SensorCapabilities) -> Self {
        if capabilities.has_step_detector {
            StepStrategy::StepDetector
        } else if capabilities.has_step_counter {
            StepStrategy::StepCounter
        } else {
            StepStrategy::AccelerometerFallback
        }
    }
}

/// One event from the motion sensor matching the active strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum MotionSample {
    /// A single detected step.
    StepDetector { timestamp_ms: i64 },
    /// Steps taken since the sensor was last reset (usually device boot).
    StepCounter { total: u32, timestamp_ms: i64 },
    /// Raw acceleration in m/s², gravity included.
    Accelerometer { x: f32, y: f32, z: f32 },
}

impl MotionSample {
    /// The strategy this sample belongs to.
    pub fn strategy(&self) -> StepStrategy {
        match self {
            MotionSample::StepDetector { .. } => StepStrategy::StepDetector,
            MotionSample::StepCounter { .. } => StepStrategy::StepCounter,
            MotionSample::Accelerometer { .. } => StepStrategy::AccelerometerFallback,
        }
    }
}

/// Mutable state shared by the three step functions.
///
/// Rebuilt on every activation, so a new recording never sees filter history,
/// counter baselines or debounce timestamps from a previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEstimatorState {
    /// First cumulative total seen since activation.
    pub baseline_counter_value: Option<u32>,
    /// Steps already on the session when this activation began.
    pub carried_steps: u32,
    /// Low-pass filtered acceleration magnitude minus gravity.
    pub filtered_acceleration: f32,
    /// Whether the previous filtered sample was above the step threshold.
    pub was_above_threshold: bool,
    /// Filtered acceleration is above the movement threshold. Not used for counting.
    pub is_moving: bool,
    /// Timestamp of the last accepted detector step; unset until one is accepted.
    pub last_step_timestamp: Option<i64>,
    /// The next detector event is a calibration artifact and must be dropped.
    pub suppress_first_event: bool,
}

impl StepEstimatorState {
    fn new(carried_steps: u32) -> Self {
        Self {
            baseline_counter_value: None,
            carried_steps,
            filtered_acceleration: 0.0,
            was_above_threshold: false,
            is_moving: false,
            last_step_timestamp: None,
            suppress_first_event: true,
        }
    }
}

impl Default for StepEstimatorState {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============================================================================
// Strategy functions
// ============================================================================

/// Handle one step-detector event. Returns the new step count if it changed.
pub fn detect_step(
    state: &mut StepEstimatorState,
    current_steps: u32,
    timestamp_ms: i64,
    config: &StepConfig,
) -> Option<u32> {
    if state.suppress_first_event {
        state.suppress_first_event = false;
        debug!("[Steps] Dropping first detector event after activation");
        return None;
    }

    if let Some(last) = state.last_step_timestamp {
        let gap = timestamp_ms.saturating_sub(last);
        if gap <= config.debounce_ms {
            debug!("[Steps] Debounced detector event {}ms after previous step", gap);
            return None;
        }
    }

    state.last_step_timestamp = Some(timestamp_ms);
    Some(current_steps.saturating_add(1))
}

/// Handle one cumulative step-counter reading. Returns the new step count if it changed.
///
/// A total below the baseline means the sensor was reset underneath us; the
/// reading becomes the new baseline and the count continues from where it was.
pub fn count_steps(state: &mut StepEstimatorState, current_steps: u32, total: u32) -> Option<u32> {
    let baseline = *state.baseline_counter_value.get_or_insert(total);

    if total < baseline {
        warn!("[Steps] Step counter went backwards ({} < {}), re-baselining", total, baseline);
        state.baseline_counter_value = Some(total);
        state.carried_steps = current_steps;
        return None;
    }

    let steps = state.carried_steps.saturating_add(total - baseline).max(current_steps);
    (steps != current_steps).then_some(steps)
}

/// Handle one raw accelerometer sample. Returns the new step count if it changed.
pub fn accelerometer_step(
    state: &mut StepEstimatorState,
    current_steps: u32,
    x: f32,
    y: f32,
    z: f32,
    config: &StepConfig,
) -> Option<u32> {
    let magnitude = (x * x + y * y + z * z).sqrt() - config.gravity;
    let alpha = config.smoothing_alpha;
    let filtered = alpha * state.filtered_acceleration + (1.0 - alpha) * magnitude;
    state.filtered_acceleration = filtered;
    state.is_moving = filtered > config.movement_threshold;

    if filtered > config.step_threshold {
        if !state.was_above_threshold {
            state.was_above_threshold = true;
            return Some(current_steps.saturating_add(1));
        }
    } else {
        state.was_above_threshold = false;
    }
    None
}

// ============================================================================
// Estimator
// ============================================================================

/// Dispatches motion samples to the strategy selected at construction.
///
/// Inert until [`activate`](Self::activate) is called; samples delivered while
/// inactive are ignored.
#[derive(Debug, Clone)]
pub struct StepEstimator {
    strategy: StepStrategy,
    config: StepConfig,
    state: StepEstimatorState,
    active: bool,
}

impl StepEstimator {
    pub fn new(capabilities: &SensorCapabilities, config: StepConfig) -> Self {
        let strategy = StepStrategy::select(capabilities);
        match strategy {
            StepStrategy::AccelerometerFallback => {
                warn!("[Steps] No step sensors available, falling back to accelerometer")
            }
            _ => info!("[Steps] Using {:?} (capabilities: {:?})", strategy, capabilities),
        }
        Self {
            strategy,
            config,
            state: StepEstimatorState::default(),
            active: false,
        }
    }

    pub fn strategy(&self) -> StepStrategy {
        self.strategy
    }

    pub fn state(&self) -> &StepEstimatorState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the accelerometer filter currently reports movement.
    /// Always `false` for the sensor-backed strategies.
    pub fn is_moving(&self) -> bool {
        self.state.is_moving
    }

    /// Start consuming samples. `carried_steps` is the count already on the
    /// session (zero for a fresh recording).
    pub fn activate(&mut self, carried_steps: u32) {
        self.state = StepEstimatorState::new(carried_steps);
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.state.is_moving = false;
    }

    /// Apply a sample to the session's step count and distance.
    ///
    /// Returns `true` if the step count changed.
    pub fn process(&mut self, sample: &MotionSample, session: &mut SessionState) -> bool {
        if !self.active {
            return false;
        }
        if sample.strategy() != self.strategy {
            debug!("[Steps] Ignoring {:?} sample under {:?}", sample.strategy(), self.strategy);
            return false;
        }

        let current = session.step_count;
        let updated = match *sample {
            MotionSample::StepDetector { timestamp_ms } => {
                detect_step(&mut self.state, current, timestamp_ms, &self.config)
            }
            MotionSample::StepCounter { total, .. } => count_steps(&mut self.state, current, total),
            MotionSample::Accelerometer { x, y, z } => {
                accelerometer_step(&mut self.state, current, x, y, z, &self.config)
            }
        };

        match updated {
            Some(steps) => {
                session.step_count = steps;
                session.distance_meters = steps as f64 * self.config.stride_length_m;
                debug!("[Steps] {} steps, {:.1}m", steps, session.distance_meters);
                true
            }
            None => false,
        }
    }
}
