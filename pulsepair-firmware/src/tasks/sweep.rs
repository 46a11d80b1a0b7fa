//! Sweep command source
//!
//! Replays the configured `(speed, hold_ms)` segments forever, the
//! forward/pause/reverse exercise used to check a freshly wired pair.

use defmt::*;
use embassy_time::Timer;

use pulsepair_core::config::SweepConfig;

use crate::channels::VELOCITY_CMD;

/// Sweep task
///
/// Writes each segment's speed into the velocity command signal, then
/// holds it for the segment's duration.
#[embassy_executor::task]
pub async fn sweep_task(sweep: SweepConfig) {
    info!("Sweep task started: {} segments", sweep.segments.len());

    loop {
        for segment in sweep.segments.iter() {
            debug!("Sweep: {} steps/s for {} ms", segment.speed, segment.hold_ms);
            VELOCITY_CMD.signal(segment.speed);
            Timer::after_millis(segment.hold_ms as u64).await;
        }
    }
}
