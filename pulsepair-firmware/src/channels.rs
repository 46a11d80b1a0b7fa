//! Inter-task communication signals
//!
//! Uses embassy-sync primitives so tasks never touch the pulse generator's
//! setpoint directly; the control task is the only writer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Requested stepper pair velocity in steps/s (latest value wins)
pub static VELOCITY_CMD: Signal<CriticalSectionRawMutex, i32> = Signal::new();
