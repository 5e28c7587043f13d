//! # GPS Track Filtering
//!
//! Reduces a noisy stream of location fixes to a clean path. A fix is appended
//! only if it is precise enough and lies in a plausible distance/speed window
//! from the last accepted fix:
//!
//! ```text
//! accuracy <= 30 m
//! 0.5 m <= d <= 5.0 m          d = haversine(last accepted, fix)
//! d / t <= 10 m/s              t = seconds since last accepted
//! ```
//!
//! The first fix of a recording segment is accepted as long as it is precise
//! enough. Rejections are ordinary outcomes, reported as [`FixDecision`] so
//! callers can log or visualize them.

use log::debug;

use crate::config::TrackFilterConfig;
use crate::geo_utils::haversine_distance;
use crate::session::SessionState;
use crate::{GeoFix, PathPoint};

/// Why a fix did not make it into the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum RejectReason {
    /// The session is not recording.
    NotRecording,
    /// Latitude/longitude are non-finite or out of range.
    InvalidCoordinates,
    /// Reported accuracy is worse than the configured maximum.
    LowAccuracy,
    /// Too close to the last accepted fix (stationary drift).
    Jitter,
    /// Too far from the last accepted fix (teleport).
    Jump,
    /// Implied speed is not plausible on foot.
    TooFast,
    /// Timestamp is not after the last accepted fix.
    OutOfOrder,
}

/// Outcome of offering one fix to the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum FixDecision {
    /// The fix was appended to the path. `first` marks the start of a segment,
    /// in which case distance and speed are zero.
    Accepted { first: bool, distance_m: f64, speed_mps: f64 },
    Rejected { reason: RejectReason },
}

impl FixDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FixDecision::Accepted { .. })
    }

    fn rejected(reason: RejectReason) -> Self {
        FixDecision::Rejected { reason }
    }
}

/// Decide whether `fix` extends a path whose last accepted fix is `last`.
///
/// Pure: callers apply the decision. `last_timestamp_ms` is normally the
/// timestamp of `last`; when it is missing one second is assumed.
///
/// # Example
/// ```
/// use walk_tracker::{GeoFix, FixDecision, TrackFilterConfig, evaluate_fix};
///
/// let config = TrackFilterConfig::default();
/// let a = GeoFix::new(0.0, 0.0, 5.0, 0);
/// let b = GeoFix::new(0.00003, 0.0, 5.0, 1000); // ~3.3m north, 1s later
///
/// assert!(evaluate_fix(&config, &a, None, None).is_accepted());
/// assert!(evaluate_fix(&config, &b, Some(&a), Some(0)).is_accepted());
/// ```
pub fn evaluate_fix(
    config: &TrackFilterConfig,
    fix: &GeoFix,
    last: Option<&GeoFix>,
    last_timestamp_ms: Option<i64>,
) -> FixDecision {
    if !fix.point().is_valid() {
        return FixDecision::rejected(RejectReason::InvalidCoordinates);
    }
    if fix.accuracy.is_nan() || fix.accuracy > config.max_accuracy_m {
        return FixDecision::rejected(RejectReason::LowAccuracy);
    }

    let Some(last) = last else {
        return FixDecision::Accepted { first: true, distance_m: 0.0, speed_mps: 0.0 };
    };

    let distance = haversine_distance(&last.point(), &fix.point());
    let elapsed_s = match last_timestamp_ms {
        Some(ts) => fix.timestamp_ms.saturating_sub(ts) as f64 / 1000.0,
        None => 1.0,
    };
    if elapsed_s <= 0.0 {
        return FixDecision::rejected(RejectReason::OutOfOrder);
    }
    let speed = distance / elapsed_s;

    if distance < config.min_distance_m {
        FixDecision::rejected(RejectReason::Jitter)
    } else if distance > config.max_distance_m {
        FixDecision::rejected(RejectReason::Jump)
    } else if speed > config.max_speed_mps {
        FixDecision::rejected(RejectReason::TooFast)
    } else {
        FixDecision::Accepted { first: false, distance_m: distance, speed_mps: speed }
    }
}

/// Applies [`evaluate_fix`] to a session while active.
#[derive(Debug, Clone)]
pub struct TrackFilter {
    config: TrackFilterConfig,
    active: bool,
}

impl TrackFilter {
    pub fn new(config: TrackFilterConfig) -> Self {
        Self { config, active: false }
    }

    pub fn config(&self) -> &TrackFilterConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop accepting fixes and forget the reference point, so the next
    /// accepted fix starts a new segment instead of bridging the gap.
    pub fn deactivate(&mut self, session: &mut SessionState) {
        self.active = false;
        session.last_accepted_fix = None;
        session.last_accepted_timestamp = None;
    }

    /// Offer a fix; on acceptance it is appended to the session's path.
    pub fn process(&self, fix: &GeoFix, session: &mut SessionState) -> FixDecision {
        if !self.active {
            debug!("[Track] Not recording, ignoring fix");
            return FixDecision::rejected(RejectReason::NotRecording);
        }

        let decision = evaluate_fix(
            &self.config,
            fix,
            session.last_accepted_fix.as_ref(),
            session.last_accepted_timestamp,
        );

        match decision {
            FixDecision::Accepted { first, distance_m, speed_mps } => {
                session.path.push(PathPoint::new(fix.latitude, fix.longitude));
                session.last_accepted_fix = Some(*fix);
                session.last_accepted_timestamp = Some(fix.timestamp_ms);
                if first {
                    debug!("[Track] Segment start at ({:.6}, {:.6})", fix.latitude, fix.longitude);
                } else {
                    debug!("[Track] Accepted fix: {:.2}m at {:.2}m/s", distance_m, speed_mps);
                }
            }
            FixDecision::Rejected { reason } => {
                debug!("[Track] Rejected fix ({:?}), accuracy {:.1}m", reason, fix.accuracy);
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::EARTH_RADIUS_METERS;

    /// Degrees of latitude spanning `meters` on the filter's sphere.
    fn lat_offset(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_METERS).to_degrees()
    }

    fn fix(lat: f64, timestamp_ms: i64) -> GeoFix {
        GeoFix::new(lat, 0.0, 5.0, timestamp_ms)
    }

    fn recording() -> (TrackFilter, SessionState) {
        let mut filter = TrackFilter::new(TrackFilterConfig::default());
        filter.activate();
        (filter, SessionState::default())
    }

    #[test]
    fn test_inactive_filter_leaves_session_untouched() {
        let filter = TrackFilter::new(TrackFilterConfig::default());
        let mut session = SessionState::default();
        let decision = filter.process(&fix(0.0, 0), &mut session);
        assert_eq!(decision, FixDecision::Rejected { reason: RejectReason::NotRecording });
        assert!(session.path.is_empty());
        assert!(session.last_accepted_fix.is_none());
    }

    #[test]
    fn test_first_fix_accepted_unconditionally() {
        let (filter, mut session) = recording();
        let decision = filter.process(&fix(31.23, 1_700_000_000_000), &mut session);
        assert_eq!(decision, FixDecision::Accepted { first: true, distance_m: 0.0, speed_mps: 0.0 });
        assert_eq!(session.path, vec![PathPoint::new(31.23, 0.0)]);
        assert_eq!(session.last_accepted_timestamp, Some(1_700_000_000_000));
    }

    #[test]
    fn test_low_accuracy_rejected_even_as_first_fix() {
        let (filter, mut session) = recording();
        let bad = GeoFix::new(0.0, 0.0, 30.5, 0);
        assert_eq!(
            filter.process(&bad, &mut session),
            FixDecision::Rejected { reason: RejectReason::LowAccuracy }
        );
        assert!(session.path.is_empty());

        // Exactly at the limit is fine
        assert!(filter.process(&GeoFix::new(0.0, 0.0, 30.0, 0), &mut session).is_accepted());
    }

    #[test]
    fn test_nan_accuracy_rejected() {
        let config = TrackFilterConfig::default();
        let f = GeoFix::new(0.0, 0.0, f32::NAN, 0);
        assert_eq!(
            evaluate_fix(&config, &f, None, None),
            FixDecision::Rejected { reason: RejectReason::LowAccuracy }
        );
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let config = TrackFilterConfig::default();
        for f in [
            GeoFix::new(f64::NAN, 0.0, 5.0, 0),
            GeoFix::new(91.0, 0.0, 5.0, 0),
            GeoFix::new(0.0, -180.5, 5.0, 0),
        ] {
            assert_eq!(
                evaluate_fix(&config, &f, None, None),
                FixDecision::Rejected { reason: RejectReason::InvalidCoordinates }
            );
        }
    }

    #[test]
    fn test_walking_scenario() {
        let (filter, mut session) = recording();

        assert!(filter.process(&fix(0.0, 0), &mut session).is_accepted());
        assert_eq!(session.path.len(), 1);

        // ~3.3m north one second later
        match filter.process(&fix(0.00003, 1000), &mut session) {
            FixDecision::Accepted { first, distance_m, speed_mps } => {
                assert!(!first);
                assert!((distance_m - 3.3358).abs() < 0.001);
                assert!((speed_mps - 3.3358).abs() < 0.001);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
        assert_eq!(session.path.len(), 2);

        // Same spot a second later is jitter
        assert_eq!(
            filter.process(&fix(0.00003, 2000), &mut session),
            FixDecision::Rejected { reason: RejectReason::Jitter }
        );
        assert_eq!(session.path.len(), 2);
        assert_eq!(session.last_accepted_timestamp, Some(1000));
    }

    #[test]
    fn test_distance_window_edges() {
        let config = TrackFilterConfig::default();
        let origin = fix(0.0, 0);

        let just_inside_low = fix(lat_offset(0.5001), 1000);
        let just_below_low = fix(lat_offset(0.4999), 1000);
        let just_inside_high = fix(lat_offset(4.999), 1000);
        let just_above_high = fix(lat_offset(5.001), 1000);

        assert!(evaluate_fix(&config, &just_inside_low, Some(&origin), Some(0)).is_accepted());
        assert!(evaluate_fix(&config, &just_inside_high, Some(&origin), Some(0)).is_accepted());
        assert_eq!(
            evaluate_fix(&config, &just_below_low, Some(&origin), Some(0)),
            FixDecision::Rejected { reason: RejectReason::Jitter }
        );
        assert_eq!(
            evaluate_fix(&config, &just_above_high, Some(&origin), Some(0)),
            FixDecision::Rejected { reason: RejectReason::Jump }
        );
    }

    #[test]
    fn test_speed_limit() {
        let config = TrackFilterConfig::default();
        let origin = fix(0.0, 0);

        // 4m in 300ms is ~13 m/s
        assert_eq!(
            evaluate_fix(&config, &fix(lat_offset(4.0), 300), Some(&origin), Some(0)),
            FixDecision::Rejected { reason: RejectReason::TooFast }
        );
        // 4m in 500ms is 8 m/s
        assert!(evaluate_fix(&config, &fix(lat_offset(4.0), 500), Some(&origin), Some(0)).is_accepted());
    }

    #[test]
    fn test_missing_timestamp_assumes_one_second() {
        let config = TrackFilterConfig::default();
        let origin = fix(0.0, 0);
        // Would be 40 m/s over 100ms, but without a reference time we assume 1s
        let next = fix(lat_offset(4.0), 100);
        assert!(evaluate_fix(&config, &next, Some(&origin), None).is_accepted());
    }

    #[test]
    fn test_out_of_order_fix_rejected() {
        let (filter, mut session) = recording();
        filter.process(&fix(0.0, 5000), &mut session);

        assert_eq!(
            filter.process(&fix(lat_offset(2.0), 5000), &mut session),
            FixDecision::Rejected { reason: RejectReason::OutOfOrder }
        );
        assert_eq!(
            filter.process(&fix(lat_offset(2.0), 4000), &mut session),
            FixDecision::Rejected { reason: RejectReason::OutOfOrder }
        );
        assert_eq!(session.path.len(), 1);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let config = TrackFilterConfig::default();
        let origin = GeoFix::new(0.0, 0.0, 5.0, i64::MAX);
        let earlier = GeoFix::new(lat_offset(2.0), 0.0, 5.0, i64::MIN);
        assert_eq!(
            evaluate_fix(&config, &earlier, Some(&origin), Some(i64::MAX)),
            FixDecision::Rejected { reason: RejectReason::OutOfOrder }
        );

        // A huge forward gap saturates into a near-zero speed
        let origin = GeoFix::new(0.0, 0.0, 5.0, i64::MIN);
        let later = GeoFix::new(lat_offset(2.0), 0.0, 5.0, i64::MAX);
        assert!(evaluate_fix(&config, &later, Some(&origin), Some(i64::MIN)).is_accepted());
    }

    #[test]
    fn test_rejection_keeps_reference_point() {
        let (filter, mut session) = recording();
        filter.process(&fix(0.0, 0), &mut session);

        // A teleport does not move the reference, so the next sane fix
        // is measured from the origin
        filter.process(&fix(lat_offset(50.0), 1000), &mut session);
        assert!(filter.process(&fix(lat_offset(3.0), 2000), &mut session).is_accepted());
        assert_eq!(session.path.len(), 2);
    }

    #[test]
    fn test_deactivate_starts_new_segment() {
        let (mut filter, mut session) = recording();
        filter.process(&fix(0.0, 0), &mut session);
        filter.process(&fix(lat_offset(3.0), 1000), &mut session);

        filter.deactivate(&mut session);
        assert!(session.last_accepted_fix.is_none());
        assert!(session.last_accepted_timestamp.is_none());
        assert_eq!(session.path.len(), 2);

        // After reactivation a far-away fix opens a new segment
        filter.activate();
        let decision = filter.process(&fix(lat_offset(500.0), 60_000), &mut session);
        assert_eq!(decision, FixDecision::Accepted { first: true, distance_m: 0.0, speed_mps: 0.0 });
        assert_eq!(session.path.len(), 3);
    }

    #[test]
    fn test_accepted_pairs_stay_in_window() {
        let (filter, mut session) = recording();
        // Mix of good steps, jitter, jumps and imprecise fixes
        let offsets = [0.0, 1.0, 1.1, 4.0, 40.0, 6.0, 6.2, 9.0, 9.0, 100.0, 12.5];
        for (i, meters) in offsets.iter().enumerate() {
            let accuracy = if i == 7 { 50.0 } else { 8.0 };
            let f = GeoFix::new(lat_offset(*meters), 0.0, accuracy, i as i64 * 1000);
            filter.process(&f, &mut session);
        }

        assert!(session.path.len() >= 3);
        for pair in session.path.windows(2) {
            let d = haversine_distance(&pair[0], &pair[1]);
            assert!((0.5..=5.0).contains(&d), "segment of {}m accepted", d);
        }
    }
}
