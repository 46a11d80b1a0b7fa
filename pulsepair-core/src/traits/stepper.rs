//! Velocity-controlled stepper trait
//!
//! The control loop only ever talks to the motors through this trait:
//! it commands a signed step rate, gates driver power and reads back the
//! live step rate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (zero or negative step rate)
    Clockwise,
    /// Counter-clockwise rotation (positive step rate)
    CounterClockwise,
}

impl Direction {
    /// Direction implied by a signed step rate
    ///
    /// A stopped motor reports [`Direction::Clockwise`].
    pub fn from_speed(steps_per_s: i32) -> Self {
        if steps_per_s > 0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Logic level for the primary axis direction line
    pub fn is_counter_clockwise(self) -> bool {
        self == Direction::CounterClockwise
    }
}

/// Trait for velocity-commanded stepper outputs
///
/// Implementations clamp every request to their limits instead of
/// returning errors, so all methods are infallible.
pub trait VelocityStepper {
    /// Command a new signed step rate in steps/s
    ///
    /// The live rate moves toward the request under the configured
    /// acceleration limit. A value of 0 stops the motors.
    fn set_velocity(&mut self, steps_per_s: i32);

    /// Get the live (not target) step rate in steps/s
    fn step_speed(&self) -> i32;

    /// Get the step rate the ramp is converging on
    fn target_speed(&self) -> i32;

    /// Get the direction implied by the live step rate
    fn direction(&self) -> Direction {
        Direction::from_speed(self.step_speed())
    }

    /// Update the speed ceiling (the sign of `max_speed` is ignored)
    ///
    /// A live rate above the new ceiling is clamped immediately, without
    /// waiting for the ramp.
    fn set_max_speed(&mut self, max_speed: i32);

    /// Power the motor drivers
    fn enable(&mut self);

    /// Remove power from the motor drivers
    fn disable(&mut self);

    /// Check if the drivers are powered
    fn is_enabled(&self) -> bool;

    /// Check if the live rate has reached the target
    fn is_at_speed(&self) -> bool {
        self.step_speed() == self.target_speed()
    }

    /// Check if the motors are stopped and will stay stopped
    fn is_stopped(&self) -> bool {
        self.step_speed() == 0 && self.is_at_speed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_speed() {
        assert_eq!(Direction::from_speed(1), Direction::CounterClockwise);
        assert_eq!(Direction::from_speed(0), Direction::Clockwise);
        assert_eq!(Direction::from_speed(-35_000), Direction::Clockwise);
    }

    #[test]
    fn test_direction_levels() {
        assert!(Direction::CounterClockwise.is_counter_clockwise());
        assert!(!Direction::Clockwise.is_counter_clockwise());
    }
}
