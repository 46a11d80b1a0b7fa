//! Ramp strategies for migrating the live speed toward a target
//!
//! A ramp is advanced from the step interrupt: the generator reports every
//! completed pulse with [`Ramp::pulse_elapsed`] and applies
//! [`Ramp::advance`] when an update is due. Two strategies exist and a
//! generator uses exactly one of them for its whole lifetime:
//!
//! - [`RampMode::PulseWait`]: one slew-limited step per update, with the
//!   number of pulses between updates taken from the pulse-wait profile.
//! - [`RampMode::Linear`]: a constant per-pulse increment planned from a
//!   constant acceleration when the target is accepted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::profile::{calculate_pulse_wait, slew_limit, MotionLimits};

/// Default acceleration for the linear ramp (steps/s²)
pub const DEFAULT_MAX_ACCEL: u32 = 100_000;

/// Ramp strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RampMode {
    /// Pulse-wait profile with one slew step per update
    #[default]
    PulseWait,
    /// Constant acceleration, one increment per pulse
    Linear {
        /// Acceleration in steps/s²
        max_accel: u32,
    },
}

/// Live ramp state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ramp {
    mode: RampMode,
    /// Pulses left before the next update (pulse-wait mode)
    pulse_wait: i32,
    /// Per-pulse speed increment (linear mode)
    increment: i32,
    /// Planned increments left before snapping to target (linear mode)
    remaining: u32,
}

impl Ramp {
    /// Create an idle ramp
    pub const fn new(mode: RampMode) -> Self {
        Self {
            mode,
            pulse_wait: 0,
            increment: 0,
            remaining: 0,
        }
    }

    /// Pulses left before the next pulse-wait update
    pub fn pulse_wait(&self) -> i32 {
        self.pulse_wait
    }

    /// Plan toward a freshly accepted target
    ///
    /// Returns the speed to apply right away. `target` must already be
    /// clamped to the speed ceiling.
    pub fn start(&mut self, current: i32, target: i32, limits: MotionLimits) -> i32 {
        if let RampMode::Linear { max_accel } = self.mode {
            let (increment, pulses) = linear_plan(current, target, max_accel, limits.max_delta_v);
            self.increment = increment;
            self.remaining = pulses;
        }
        self.advance(current, target, limits)
    }

    /// Apply the next increment toward `target`
    ///
    /// The result never overshoots `target`, never differs from `current`
    /// by more than `max_delta_v` and is never zero while `target` is not.
    pub fn advance(&mut self, current: i32, target: i32, limits: MotionLimits) -> i32 {
        let candidate = match self.mode {
            RampMode::PulseWait => target,
            RampMode::Linear { .. } => {
                if self.remaining > 1 {
                    self.remaining -= 1;
                    let stepped = current.saturating_add(self.increment);
                    let passed = (self.increment > 0 && stepped > target)
                        || (self.increment < 0 && stepped < target);
                    if passed {
                        target
                    } else {
                        stepped
                    }
                } else {
                    self.remaining = 0;
                    target
                }
            }
        };

        let next = keep_moving(current, slew_limit(current, candidate, limits.max_delta_v), target);

        if self.mode == RampMode::PulseWait {
            self.pulse_wait = calculate_pulse_wait(next, target, limits.max_speed);
        }

        next
    }

    /// Count one completed step pulse
    ///
    /// Returns true when the next speed update is due.
    pub fn pulse_elapsed(&mut self) -> bool {
        match self.mode {
            RampMode::PulseWait => {
                self.pulse_wait = self.pulse_wait.saturating_sub(1);
                self.pulse_wait <= 0
            }
            RampMode::Linear { .. } => true,
        }
    }
}

/// Keep a ramp that crosses zero from stalling on a stopped timer
///
/// A stopped motor emits no pulses, so an update landing on 0 while the
/// target is nonzero lands on the slowest speed instead.
fn keep_moving(current: i32, next: i32, target: i32) -> i32 {
    if next != 0 || target == 0 {
        return next;
    }
    if current != 0 {
        current.signum()
    } else {
        target.signum()
    }
}

/// Per-pulse increment and pulse count for a constant-acceleration ramp
///
/// The pulse count is the distance (in steps) covered while changing
/// speed: `|t² - c²| / 2a`, or `(t² + c²) / 2a` through a reversal.
fn linear_plan(current: i32, target: i32, max_accel: u32, max_delta_v: u32) -> (i32, u32) {
    let dv = target as i64 - current as i64;
    if dv == 0 {
        return (0, 0);
    }

    let c = current as i64;
    let t = target as i64;
    let distance = if c * t < 0 {
        c * c + t * t
    } else {
        (t * t - c * c).abs()
    };

    let accel = max_accel.max(1) as i64;
    let mut pulses = (distance / (2 * accel)).max(1);
    let mut increment = dv / pulses;

    if increment == 0 {
        increment = dv.signum();
        pulses = dv.abs();
    }

    let max_dv = max_delta_v.max(1) as i64;
    if increment.abs() > max_dv {
        increment = max_dv * dv.signum();
        pulses = (dv.abs() + max_dv - 1) / max_dv;
    }

    (increment as i32, pulses.min(u32::MAX as i64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::profile::clamp_speed;
    use proptest::prelude::*;

    const LIMITS: MotionLimits = MotionLimits {
        max_speed: 35_000,
        max_delta_v: 800,
    };

    /// Drive a ramp the way the step interrupt does, returning the number of
    /// updates needed to reach the target
    fn run_to_target(ramp: &mut Ramp, mut current: i32, target: i32, limits: MotionLimits) -> u32 {
        let mut updates = 0;
        current = ramp.start(current, target, limits);
        while current != target {
            let next = ramp.advance(current, target, limits);
            assert!((next as i64 - current as i64).abs() <= limits.max_delta_v as i64);
            assert!((target as i64 - next as i64).abs() < (target as i64 - current as i64).abs());
            assert!(next != 0 || target == 0);
            current = next;
            updates += 1;
            assert!(updates < 1_000_000, "ramp did not converge");
        }
        updates
    }

    #[test]
    fn test_pulse_wait_start_slews_one_step() {
        let mut ramp = Ramp::new(RampMode::PulseWait);
        assert_eq!(ramp.start(0, 1000, LIMITS), 800);
        // (800 - 1500) * 1000 / 35000 < 0: next pulse
        assert!(ramp.pulse_wait() <= 0);
        assert!(ramp.pulse_elapsed());
    }

    #[test]
    fn test_pulse_wait_counts_down() {
        let mut ramp = Ramp::new(RampMode::PulseWait);
        // 10000 -> 20000 accelerating: (10800 - 1500) * 1000 / 35000 = 265
        let next = ramp.start(10_000, 20_000, LIMITS);
        assert_eq!(next, 10_800);
        assert_eq!(ramp.pulse_wait(), 265);

        for _ in 0..264 {
            assert!(!ramp.pulse_elapsed());
        }
        assert!(ramp.pulse_elapsed());
    }

    #[test]
    fn test_zero_crossing_does_not_stall() {
        let mut ramp = Ramp::new(RampMode::PulseWait);
        // 800 -> -100 would land exactly on zero
        assert_eq!(ramp.start(800, -100, LIMITS), 1);
        assert_eq!(ramp.advance(1, -100, LIMITS), -100);
    }

    #[test]
    fn test_stopping_reaches_zero() {
        let mut ramp = Ramp::new(RampMode::PulseWait);
        assert_eq!(ramp.start(800, 0, LIMITS), 0);
    }

    #[test]
    fn test_linear_plan_constant_accel() {
        // 0 -> 10000 at 100000 steps/s²: 10000² / 200000 = 500 pulses of 20
        assert_eq!(linear_plan(0, 10_000, 100_000, 800), (20, 500));
        // Reversal covers both halves
        assert_eq!(linear_plan(10_000, -10_000, 100_000, 800), (-20, 1000));
        // Short ramps collapse to a single slew-bounded step
        assert_eq!(linear_plan(0, 100, 100_000, 800), (100, 1));
        assert_eq!(linear_plan(500, 500, 100_000, 800), (0, 0));
    }

    #[test]
    fn test_linear_plan_respects_slew_limit() {
        // Huge acceleration asks for one big jump; the slew limit splits it
        let (increment, pulses) = linear_plan(0, 35_000, u32::MAX, 800);
        assert_eq!(increment, 800);
        assert_eq!(pulses, 44);
    }

    #[test]
    fn test_linear_ramp_reaches_target() {
        let mut ramp = Ramp::new(RampMode::Linear { max_accel: 100_000 });
        let updates = run_to_target(&mut ramp, 0, 10_000, LIMITS);
        // One increment was applied by start()
        assert_eq!(updates, 499);
    }

    #[test]
    fn test_linear_updates_every_pulse() {
        let mut ramp = Ramp::new(RampMode::Linear { max_accel: 100_000 });
        ramp.start(0, 10_000, LIMITS);
        assert!(ramp.pulse_elapsed());
        assert!(ramp.pulse_elapsed());
    }

    proptest! {
        #[test]
        fn prop_pulse_wait_converges(
            c in -35_000i32..=35_000,
            v in any::<i32>(),
        ) {
            let target = clamp_speed(v, LIMITS.max_speed);
            let mut ramp = Ramp::new(RampMode::PulseWait);
            let updates = run_to_target(&mut ramp, c, target, LIMITS);
            // 70000 steps/s span at 800 per step, plus one step across zero
            prop_assert!(updates <= 90);
        }

        #[test]
        fn prop_linear_converges(
            c in -35_000i32..=35_000,
            v in -35_000i32..=35_000,
            accel in 1_000u32..1_000_000,
        ) {
            let mut ramp = Ramp::new(RampMode::Linear { max_accel: accel });
            run_to_target(&mut ramp, c, v, LIMITS);
        }
    }
}
