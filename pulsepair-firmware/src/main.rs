//! PulsePair - mirrored stepper pair velocity controller
//!
//! Firmware for RP2040 boards driving two stepper drivers from one step
//! line with opposite direction lines. A hardware timer interrupt
//! generates the step waveform and runs the velocity ramp; Embassy tasks
//! feed it velocity requests.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use pulsepair_core::config::{parse_config, MachineConfig};
use pulsepair_core::traits::VelocityStepper;
use pulsepair_drivers::stepper::{PairPins, PulseSlot, StepperPulseGenerator};
use pulsepair_hal_rp2040::{pair_output, AlarmTimer, PairOutput};

mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Time the drivers need after power-up before they accept enable
const DRIVER_POWER_UP_MS: u64 = 200;

/// Pulse generator type for this board
pub type Steppers = StepperPulseGenerator<PairOutput<'static>, AlarmTimer>;

/// The stepper pair, shared between the control task and the step interrupt
pub static STEPPERS: PulseSlot<Steppers> = PulseSlot::new();

/// Step timer expiry handler (interrupt context)
fn step_timer_expired() {
    STEPPERS.on_timer_expiry();
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PulsePair firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let pair_config = &config.stepper_pair;
    info!(
        "Stepper pair: max {} steps/s, slew {} steps/s, pulse {} us, ramp {}",
        pair_config.max_speed, pair_config.max_delta_v, pair_config.high_pulse_us, pair_config.ramp
    );

    // Enables start at their disabled level; the generator drives the rest
    let disabled = pair_config.enable_inverted;
    let pins = PairPins {
        step: pair_output(p.PIN_11, false),
        dir_a: pair_output(p.PIN_10, false),
        dir_b: pair_output(p.PIN_5, true),
        enable_a: pair_output(p.PIN_12, disabled),
        enable_b: pair_output(p.PIN_7, disabled),
    };

    let Some(timer) = AlarmTimer::take() else {
        error!("Step timer alarm already in use");
        return;
    };

    let steppers = match StepperPulseGenerator::new(pins, timer, pair_config, step_timer_expired) {
        Ok(steppers) => steppers,
        Err(e) => {
            error!("Stepper pair config rejected: {:?}", e);
            return;
        }
    };
    STEPPERS.register(steppers);
    info!("Stepper pair registered");

    // Let the drivers power up before enabling them
    Timer::after_millis(DRIVER_POWER_UP_MS).await;
    STEPPERS.with(|steppers| steppers.enable());
    info!("Stepper drivers enabled");

    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(tasks::heartbeat_task(led)).unwrap();
    spawner.spawn(tasks::control_task()).unwrap();
    if config.sweep.is_enabled() {
        spawner.spawn(tasks::sweep_task(config.sweep)).unwrap();
    } else {
        info!("Sweep disabled, waiting for velocity commands");
    }

    info!("All tasks spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> MachineConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded embedded machine.toml");
            config
        }
        Err(e) => {
            warn!("machine.toml rejected ({:?}), using defaults", e);
            MachineConfig::new()
        }
    }
}
