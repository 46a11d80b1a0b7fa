//! Speed limits and the pulse-wait acceleration profile
//!
//! The pulse-wait profile decides how many step pulses must elapse before
//! the next incremental speed change. Both branches are linear in the
//! current speed and were tuned on the machine to avoid mechanical
//! resonance and driver lockout; they are not derived from motor physics.

/// Microseconds per second
pub const MICROS_PER_SECOND: u32 = 1_000_000;

/// Speed offset of the acceleration profile (steps/s)
pub const ACCEL_OFFSET: i64 = 1500;

/// Gain of the acceleration profile
pub const ACCEL_GAIN: i64 = 1000;

/// Speed offset of the deceleration profile (steps/s)
pub const DECEL_OFFSET: i64 = 50;

/// Gain of the deceleration profile
pub const DECEL_GAIN: i64 = 30;

/// Shortest low phase the timer is ever programmed with (µs)
pub const MIN_LOW_PULSE_US: u32 = 1;

/// Speed and acceleration ceilings of one axis pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionLimits {
    /// Maximum speed magnitude (steps/s)
    pub max_speed: u32,
    /// Maximum speed change per update (steps/s)
    pub max_delta_v: u32,
}

/// Which limits the last accepted command ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LimitFlags {
    /// Request exceeded the speed ceiling and was clamped
    pub speed_clamped: bool,
    /// Request was further than one slew step away from the live speed
    pub slew_limited: bool,
}

/// Clamp a requested speed to `±max_speed`, preserving its sign
pub fn clamp_speed(requested: i32, max_speed: u32) -> i32 {
    let max = max_speed.min(i32::MAX as u32) as i32;
    requested.clamp(-max, max)
}

/// Move from `current` toward `target` by at most `max_delta_v`
///
/// Returns `target` when it is within one slew step, otherwise
/// `current ± max_delta_v`.
pub fn slew_limit(current: i32, target: i32, max_delta_v: u32) -> i32 {
    let delta = target as i64 - current as i64;
    let max_dv = max_delta_v as i64;

    if delta.abs() > max_dv {
        (current as i64 + max_dv * delta.signum()) as i32
    } else {
        target
    }
}

/// Check if the ramp is moving away from zero toward the target
///
/// Only true when both speeds have the same sign and the target is faster.
pub fn is_accelerating(current: i32, target: i32) -> bool {
    target.unsigned_abs() > current.unsigned_abs() && (target as i64) * (current as i64) > 0
}

/// Number of pulses to wait before the next incremental speed change
///
/// A zero or negative result means the update is due on the very next
/// pulse. A `max_speed` of zero yields 0 instead of dividing by zero.
pub fn calculate_pulse_wait(current: i32, target: i32, max_speed: u32) -> i32 {
    if max_speed == 0 {
        return 0;
    }

    let speed = current.unsigned_abs() as i64;
    let max = max_speed as i64;

    let wait = if is_accelerating(current, target) {
        ((speed - ACCEL_OFFSET) * ACCEL_GAIN) / max
    } else {
        ((speed - DECEL_OFFSET) * DECEL_GAIN) / max
    };

    wait.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Full step period for a speed, rounded to the nearest microsecond
///
/// Returns `None` for a stopped motor, where the period is undefined.
pub fn step_period_us(speed: i32) -> Option<u32> {
    let speed = speed.unsigned_abs();
    if speed == 0 {
        return None;
    }
    Some((MICROS_PER_SECOND + speed / 2) / speed)
}

/// Low phase duration for a speed and a fixed high pulse width
///
/// The result is never shorter than [`MIN_LOW_PULSE_US`].
pub fn low_pulse_us(speed: i32, high_pulse_us: u32) -> Option<u32> {
    step_period_us(speed).map(|period| period.saturating_sub(high_pulse_us).max(MIN_LOW_PULSE_US))
}

/// Fastest speed whose rounded step period is still longer than the high pulse
///
/// The rounded period exceeds `high_pulse_us` exactly when
/// `speed <= 2_000_000 / (2 * high_pulse_us + 1)`.
pub fn max_speed_for_high_pulse(high_pulse_us: u32) -> u32 {
    let divisor = 2 * high_pulse_us as u64 + 1;
    (2 * MICROS_PER_SECOND as u64 / divisor) as u32
}
