//! Step pulse generator for a mirrored stepper pair
//!
//! Both drivers share one step line. Their direction lines are always
//! driven to opposite levels, so the two motors turn in mirrored
//! directions at the same rate.
//!
//! The waveform is produced by a periodic timer whose expiry alternates
//! the step line between a fixed-width HIGH pulse and a LOW gap sized to
//! the live speed. Speed changes requested with `set_velocity` take the
//! first slew-limited step immediately; the rest of the ramp runs from the
//! timer expiry handler, paced by the configured [`RampMode`].
//!
//! # Usage
//!
//! ```ignore
//! static STEPPERS: PulseSlot<Generator> = PulseSlot::new();
//!
//! fn step_isr() {
//!     STEPPERS.on_timer_expiry();
//! }
//!
//! let generator = StepperPulseGenerator::new(pins, timer, &config, step_isr)?;
//! STEPPERS.register(generator);
//! STEPPERS.with(|g| g.set_velocity(1000));
//! ```
//!
//! [`RampMode`]: pulsepair_core::motion::RampMode

use pulsepair_core::config::{ConfigError, StepperPairConfig};
use pulsepair_core::motion::{
    clamp_speed, low_pulse_us, max_speed_for_high_pulse, LimitFlags, MotionLimits, Ramp,
};
use pulsepair_core::traits::{Direction, VelocityStepper};
use pulsepair_hal::{OutputPin, PeriodicTimer};

/// Output lines driven by the generator
pub struct PairPins<P> {
    /// Shared step line
    pub step: P,
    /// Direction line of the primary driver
    pub dir_a: P,
    /// Direction line of the mirrored driver
    pub dir_b: P,
    /// Enable line of the primary driver
    pub enable_a: P,
    /// Enable line of the mirrored driver
    pub enable_b: P,
}

/// Level the step line is currently holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePhase {
    /// Inside the fixed-width step pulse
    High,
    /// Inside the gap between pulses (or idle)
    Low,
}

/// Timer-driven step generator with an interrupt-paced velocity ramp
///
/// Shared with the timer interrupt through a
/// [`PulseSlot`](super::PulseSlot), which serializes every call.
pub struct StepperPulseGenerator<P, T> {
    pins: PairPins<P>,
    timer: T,
    /// Handler passed to the timer on every waveform restart
    on_expiry: fn(),
    limits: MotionLimits,
    high_pulse_us: u32,
    /// Enable lines are active-low
    enable_inverted: bool,
    /// Live signed rate in steps/s
    step_speed: i32,
    /// Clamped rate the ramp converges on
    target_speed: i32,
    low_pulse_us: u32,
    phase: PulsePhase,
    ramp: Ramp,
    limit_flags: LimitFlags,
    enabled: bool,
}

impl<P: OutputPin, T: PeriodicTimer> StepperPulseGenerator<P, T> {
    /// Create a stopped, disabled generator
    ///
    /// Drives the step line LOW, the direction lines to their clockwise
    /// levels and both enable lines to their disabled level.
    pub fn new(
        mut pins: PairPins<P>,
        mut timer: T,
        config: &StepperPairConfig,
        on_expiry: fn(),
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        timer.end();
        pins.step.set_low();
        pins.dir_a.set_low();
        pins.dir_b.set_high();

        let mut generator = Self {
            pins,
            timer,
            on_expiry,
            limits: config.limits(),
            high_pulse_us: config.high_pulse_us,
            enable_inverted: config.enable_inverted,
            step_speed: 0,
            target_speed: 0,
            low_pulse_us: 0,
            phase: PulsePhase::Low,
            ramp: Ramp::new(config.ramp),
            limit_flags: LimitFlags::default(),
            enabled: false,
        };
        generator.drive_enable_lines(false);

        Ok(generator)
    }

    /// Handle one timer expiry
    ///
    /// Call from the timer interrupt. Ends the current phase, reprograms
    /// the timer for the next one and, once per completed pulse, advances
    /// the ramp when an update is due. Never blocks.
    pub fn on_timer_expiry(&mut self) {
        if self.step_speed == 0 {
            return;
        }

        match self.phase {
            PulsePhase::High => {
                self.pins.step.set_low();
                self.timer.update(self.low_pulse_us);
                self.phase = PulsePhase::Low;

                if self.step_speed != self.target_speed && self.ramp.pulse_elapsed() {
                    self.step_speed = self.ramp.advance(self.step_speed, self.target_speed, self.limits);
                    self.retune_waveform();
                }
            }
            PulsePhase::Low => {
                self.pins.step.set_high();
                self.timer.update(self.high_pulse_us);
                self.phase = PulsePhase::High;
            }
        }
    }

    /// Get the limits applied to the most recent `set_velocity`
    pub fn last_limits(&self) -> LimitFlags {
        self.limit_flags
    }

    /// Get the current speed ceiling in steps/s
    pub fn max_speed(&self) -> u32 {
        self.limits.max_speed
    }

    /// Get the LOW phase duration in µs (0 when stopped)
    pub fn low_pulse_us(&self) -> u32 {
        self.low_pulse_us
    }

    /// Get the fixed HIGH pulse width in µs
    pub fn high_pulse_us(&self) -> u32 {
        self.high_pulse_us
    }

    /// Get the level the step line is holding
    pub fn phase(&self) -> PulsePhase {
        self.phase
    }

    /// Pulses left before the next ramp update
    pub fn pulse_wait(&self) -> i32 {
        self.ramp.pulse_wait()
    }

    /// Stop the waveform and hand back the pins and timer
    pub fn release(mut self) -> (PairPins<P>, T) {
        self.stop_waveform();
        (self.pins, self.timer)
    }

    /// Start a fresh waveform at the live speed, beginning with a HIGH pulse
    fn restart_waveform(&mut self) {
        match low_pulse_us(self.step_speed, self.high_pulse_us) {
            Some(low) => {
                self.drive_direction_lines();
                self.low_pulse_us = low;
                self.pins.step.set_high();
                self.phase = PulsePhase::High;
                self.timer.begin(self.on_expiry, self.high_pulse_us);
            }
            None => self.stop_waveform(),
        }
    }

    /// Apply a ramp step taken at the start of a LOW phase
    ///
    /// The waveform keeps running; only the gap being timed is resized.
    fn retune_waveform(&mut self) {
        match low_pulse_us(self.step_speed, self.high_pulse_us) {
            Some(low) => {
                self.drive_direction_lines();
                self.low_pulse_us = low;
                self.timer.update(low);
            }
            None => self.stop_waveform(),
        }
    }

    fn stop_waveform(&mut self) {
        self.timer.end();
        self.pins.step.set_low();
        self.phase = PulsePhase::Low;
        self.low_pulse_us = 0;
    }

    fn drive_direction_lines(&mut self) {
        let ccw = Direction::from_speed(self.step_speed).is_counter_clockwise();
        self.pins.dir_a.set_state(ccw);
        self.pins.dir_b.set_state(!ccw);
    }

    fn drive_enable_lines(&mut self, enabled: bool) {
        let level = enabled != self.enable_inverted;
        self.pins.enable_a.set_state(level);
        self.pins.enable_b.set_state(level);
        self.enabled = enabled;
    }
}

impl<P: OutputPin, T: PeriodicTimer> VelocityStepper for StepperPulseGenerator<P, T> {
    fn set_velocity(&mut self, steps_per_s: i32) {
        let target = clamp_speed(steps_per_s, self.limits.max_speed);
        let next = self.ramp.start(self.step_speed, target, self.limits);

        self.limit_flags = LimitFlags {
            speed_clamped: target != steps_per_s,
            slew_limited: next != target,
        };
        self.target_speed = target;
        self.step_speed = next;

        self.restart_waveform();
    }

    fn step_speed(&self) -> i32 {
        self.step_speed
    }

    fn target_speed(&self) -> i32 {
        self.target_speed
    }

    fn set_max_speed(&mut self, max_speed: i32) {
        let max = max_speed
            .unsigned_abs()
            .min(max_speed_for_high_pulse(self.high_pulse_us));
        self.limits.max_speed = max;

        // The ceiling takes effect at once, ahead of the slew limit
        if self.step_speed.unsigned_abs() > max || self.target_speed.unsigned_abs() > max {
            self.step_speed = clamp_speed(self.step_speed, max);
            self.set_velocity(self.target_speed);
        }
    }

    fn enable(&mut self) {
        self.drive_enable_lines(true);
    }

    fn disable(&mut self) {
        self.drive_enable_lines(false);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
