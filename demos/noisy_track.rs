//! Feed a noisy GPS trace through the track filter and report each decision.
//!
//! Run with: cargo run --example noisy_track

use walk_tracker::{FixDecision, GeoFix, SensorCapabilities, Tracker};

fn main() {
    let mut tracker = Tracker::new(&SensorCapabilities::default());
    tracker.start();

    // (lat offset in degrees, accuracy, seconds)
    let trace = [
        (0.0, 8.0, 0),
        (0.00002, 9.0, 1),     // ~2.2m: good
        (0.000021, 7.0, 2),    // ~0.1m: standing still
        (0.0004, 12.0, 3),     // ~42m: teleport
        (0.00005, 55.0, 4),    // poor accuracy
        (0.000045, 10.0, 5),   // ~2.8m from last accepted: good
        (0.000085, 6.0, 5),    // same second as previous: out of order
        (0.000085, 6.0, 6),    // ~4.4m: good
    ];

    for (offset, accuracy, seconds) in trace {
        let fix = GeoFix::new(47.3769 + offset, 8.5417, accuracy, seconds * 1000);
        match tracker.on_fix(&fix) {
            FixDecision::Accepted { first: true, .. } => println!("t={}s  first point", seconds),
            FixDecision::Accepted { distance_m, speed_mps, .. } => {
                println!("t={}s  accepted  {:.2} m at {:.2} m/s", seconds, distance_m, speed_mps)
            }
            FixDecision::Rejected { reason } => println!("t={}s  rejected  {:?}", seconds, reason),
        }
    }

    println!("\nPath has {} points", tracker.path().len());
}
