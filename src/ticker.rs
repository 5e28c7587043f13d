//! Elapsed-time accrual for hosts running a tokio runtime.
//!
//! The ticker adds one tick interval to the session every period while the
//! recording run it was spawned for is still going. It exits on the first tick
//! that finds the session idle or on a later run (see [`Tracker::generation`]),
//! so pausing is all it takes to stop it; starting again needs a new ticker.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::Tracker;

/// Tracker shared between the event handlers and the ticker task.
pub type SharedTracker = Arc<Mutex<Tracker>>;

/// Spawn the ticker for a tracker that has just started or resumed recording.
///
/// The period is the configured `tick_interval_ms`. The first tick fires one
/// full period after spawning.
pub fn spawn_ticker(tracker: SharedTracker) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (period, generation) = {
            let guard = tracker.lock().await;
            let period = Duration::from_millis(guard.config().tick_interval_ms.max(1) as u64);
            (period, guard.generation())
        };
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let mut guard = tracker.lock().await;
            if guard.generation() != generation {
                debug!("[Ticker] Recording run {} superseded, stopping", generation);
                break;
            }
            if !guard.tick() {
                debug!("[Ticker] Session idle, stopping at {}ms", guard.elapsed_ms());
                break;
            }
        }
    })
}
