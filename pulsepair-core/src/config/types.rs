//! Configuration type definitions
//!
//! These types represent the machine configuration. The firmware embeds a
//! TOML file which is parsed into [`MachineConfig`] at boot.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::{max_speed_for_high_pulse, MotionLimits, RampMode};

/// Default speed ceiling (steps/s)
pub const DEFAULT_MAX_SPEED: u32 = 35_000;

/// Default slew limit per speed update (steps/s)
pub const DEFAULT_MAX_DELTA_V: u32 = 800;

/// Default step pulse high time (µs)
pub const DEFAULT_HIGH_PULSE_US: u32 = 3;

/// Maximum sweep segments per config
pub const MAX_SWEEP_SEGMENTS: usize = 8;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Maximum speed is zero
    ZeroMaxSpeed,
    /// Slew limit is zero, the ramp could never move
    ZeroSlewLimit,
    /// High pulse duration is zero
    ZeroHighPulse,
    /// High pulse does not fit in the step period at maximum speed
    PulseTooWide,
    /// Linear ramp configured without acceleration
    ZeroAcceleration,
}

/// Mirrored stepper pair configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperPairConfig {
    /// Speed ceiling (steps/s)
    pub max_speed: u32,
    /// Largest speed change applied by a single update (steps/s)
    pub max_delta_v: u32,
    /// Step pulse high time (µs)
    pub high_pulse_us: u32,
    /// Enable pins are active-low (driver enabled when low)
    pub enable_inverted: bool,
    /// Ramp strategy
    pub ramp: RampMode,
}

impl Default for StepperPairConfig {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            max_delta_v: DEFAULT_MAX_DELTA_V,
            high_pulse_us: DEFAULT_HIGH_PULSE_US,
            enable_inverted: true,
            ramp: RampMode::PulseWait,
        }
    }
}

impl StepperPairConfig {
    /// Check the configuration for values the pulse generator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_speed == 0 {
            return Err(ConfigError::ZeroMaxSpeed);
        }
        if self.max_delta_v == 0 {
            return Err(ConfigError::ZeroSlewLimit);
        }
        if self.high_pulse_us == 0 {
            return Err(ConfigError::ZeroHighPulse);
        }

        if self.max_speed > max_speed_for_high_pulse(self.high_pulse_us) {
            return Err(ConfigError::PulseTooWide);
        }

        if let RampMode::Linear { max_accel: 0 } = self.ramp {
            return Err(ConfigError::ZeroAcceleration);
        }

        Ok(())
    }

    /// Speed and slew ceilings
    pub fn limits(&self) -> MotionLimits {
        MotionLimits {
            max_speed: self.max_speed,
            max_delta_v: self.max_delta_v,
        }
    }
}

/// One segment of the sweep command sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepSegment {
    /// Commanded speed (steps/s)
    pub speed: i32,
    /// How long the command is held (ms)
    pub hold_ms: u32,
}

/// Sweep command source configuration
///
/// The sweep replays its segments forever. An empty list disables it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepConfig {
    /// Segments in replay order
    pub segments: Vec<SweepSegment, MAX_SWEEP_SEGMENTS>,
}

impl SweepConfig {
    /// Check if the sweep has anything to replay
    pub fn is_enabled(&self) -> bool {
        !self.segments.is_empty()
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Pulse generator settings
    pub stepper_pair: StepperPairConfig,
    /// Sweep command source
    pub sweep: SweepConfig,
}

impl MachineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(StepperPairConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = StepperPairConfig {
            max_speed: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxSpeed));

        let config = StepperPairConfig {
            max_delta_v: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSlewLimit));

        let config = StepperPairConfig {
            high_pulse_us: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHighPulse));
    }

    #[test]
    fn test_rejects_pulse_wider_than_period() {
        // 200000 steps/s = 5µs period
        let config = StepperPairConfig {
            max_speed: 200_000,
            high_pulse_us: 5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PulseTooWide));

        let config = StepperPairConfig {
            max_speed: 200_000,
            high_pulse_us: 4,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_linear_without_accel() {
        let config = StepperPairConfig {
            ramp: RampMode::Linear { max_accel: 0 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroAcceleration));
    }

    #[test]
    fn test_sweep_enabled() {
        let mut sweep = SweepConfig::default();
        assert!(!sweep.is_enabled());
        sweep
            .segments
            .push(SweepSegment {
                speed: 1000,
                hold_ms: 2000,
            })
            .unwrap();
        assert!(sweep.is_enabled());
    }
}
