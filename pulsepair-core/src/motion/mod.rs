//! Motion math for the step pulse generator
//!
//! Everything here is pure integer arithmetic that is safe to run from the
//! step interrupt: no allocation, no panics, bounded time.

pub mod profile;
pub mod ramp;

pub use profile::{
    calculate_pulse_wait, clamp_speed, is_accelerating, low_pulse_us, max_speed_for_high_pulse,
    slew_limit, step_period_us, LimitFlags, MotionLimits,
};
pub use ramp::{Ramp, RampMode, DEFAULT_MAX_ACCEL};
