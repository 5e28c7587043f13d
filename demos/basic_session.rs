//! Record a short walk with a step-counter device, then save it.
//!
//! Run with: cargo run --example basic_session

use walk_tracker::{GeoFix, MotionSample, SensorCapabilities, Tracker};

fn main() {
    let caps = SensorCapabilities { has_step_detector: false, has_step_counter: true };
    let mut tracker = Tracker::new(&caps);
    println!("Strategy: {:?}\n", tracker.strategy());

    tracker.start();

    // Walk north ~1.4m per second for 20 seconds, stepping twice a second
    let boot_total = 48_210;
    for second in 0..20i64 {
        let lat = 31.2304 + second as f64 * 0.0000126;
        tracker.on_fix(&GeoFix::new(lat, 121.4737, 6.0, second * 1000));
        tracker.on_motion(&MotionSample::StepCounter {
            total: boot_total + (second as u32) * 2,
            timestamp_ms: second * 1000,
        });
        tracker.tick();
    }

    println!("Live session:");
    println!("  elapsed:  {}", walk_tracker::format_elapsed(tracker.elapsed_ms()));
    println!("  steps:    {}", tracker.step_count());
    println!("  distance: {:.2} km", tracker.distance_meters() / 1000.0);
    println!("  points:   {}\n", tracker.path().len());

    tracker.pause();
    if let Some(record) = tracker.save() {
        println!("Saved record #{}:", tracker.history().len());
        println!("  {} | {:.2} km | {} steps", record.elapsed_label(), record.distance_km, record.step_count);
        println!("  path length: {:.1} m over {} points", record.path_length_m(), record.path.len());
        if let Some(bounds) = record.bounds() {
            let center = bounds.center();
            println!("  map center: ({:.6}, {:.6})", center.latitude, center.longitude);
        }
    }
}
