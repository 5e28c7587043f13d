//! Drive elapsed time from the tokio ticker while events arrive.
//!
//! Run with: cargo run --example ticker_session --features runtime

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use walk_tracker::{spawn_ticker, MotionSample, SensorCapabilities, Tracker};

#[tokio::main]
async fn main() {
    let caps = SensorCapabilities { has_step_detector: true, has_step_counter: false };
    let tracker = Arc::new(Mutex::new(Tracker::new(&caps)));

    tracker.lock().await.start();
    let ticker = spawn_ticker(tracker.clone());

    for i in 0..6i64 {
        tokio::time::sleep(Duration::from_millis(600)).await;
        let mut guard = tracker.lock().await;
        guard.on_motion(&MotionSample::StepDetector { timestamp_ms: i * 600 });
        println!("{} ms, {} steps", guard.elapsed_ms(), guard.step_count());
    }

    tracker.lock().await.pause();
    let _ = ticker.await;
    println!("Paused at {}", walk_tracker::format_elapsed(tracker.lock().await.elapsed_ms()));
}
