//! Stepper pair control loop
//!
//! Forwards velocity requests to the pulse generator registered in
//! [`STEPPERS`](crate::STEPPERS) and periodically reports the live speed.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use pulsepair_core::traits::VelocityStepper;

use crate::channels::VELOCITY_CMD;
use crate::STEPPERS;

/// Status report interval in milliseconds
const STATUS_INTERVAL_MS: u64 = 250;

/// Control task for the stepper pair
///
/// A request is applied only when it differs from the last one applied, so
/// a repeated request does not restart the waveform.
#[embassy_executor::task]
pub async fn control_task() {
    info!("Control task started");

    let mut ticker = Ticker::every(Duration::from_millis(STATUS_INTERVAL_MS));
    let mut last_request: i32 = 0;

    loop {
        match select(VELOCITY_CMD.wait(), ticker.next()).await {
            Either::First(request) => {
                if request == last_request {
                    continue;
                }
                last_request = request;

                let applied = STEPPERS.with(|steppers| {
                    steppers.set_velocity(request);
                    (steppers.target_speed(), steppers.step_speed(), steppers.last_limits())
                });

                match applied {
                    Some((target, speed, limits)) => {
                        debug!("Velocity {} -> target {}, live {}", request, target, speed);
                        if limits.speed_clamped {
                            debug!("Velocity request clamped to {}", target);
                        }
                    }
                    None => warn!("Velocity request {} dropped: no steppers registered", request),
                }
            }
            Either::Second(_) => {
                if let Some((speed, target, low_us)) =
                    STEPPERS.with(|s| (s.step_speed(), s.target_speed(), s.low_pulse_us()))
                {
                    trace!("Stepper pair: {} / {} steps/s, low {} us", speed, target, low_us);
                }
            }
        }
    }
}
