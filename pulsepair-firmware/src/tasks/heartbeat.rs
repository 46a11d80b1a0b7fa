//! Status LED heartbeat

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

/// LED toggle interval in milliseconds
const BLINK_INTERVAL_MS: u64 = 500;

/// Blink the status LED so a hung executor is visible on the board
#[embassy_executor::task]
pub async fn heartbeat_task(mut led: Output<'static>) {
    info!("Heartbeat task started");

    let mut ticker = Ticker::every(Duration::from_millis(BLINK_INTERVAL_MS));
    loop {
        ticker.next().await;
        led.toggle();
    }
}
