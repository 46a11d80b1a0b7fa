//! RP2040-specific HAL for the PulsePair firmware
//!
//! This crate provides RP2040 implementations of the `pulsepair-hal`
//! collaborator traits:
//!
//! - Step timer on hardware alarm 1 (implements `pulsepair_hal::PeriodicTimer`)
//! - Push-pull GPIO outputs (implement `pulsepair_hal::OutputPin`)

#![no_std]

pub mod alarm;
pub mod gpio;

pub use alarm::AlarmTimer;
pub use gpio::{pair_output, PairOutput};
