//! Hardware driver implementations
//!
//! This crate provides the step pulse generator for a mirrored stepper
//! pair, written against the `pulsepair-hal` collaborator traits:
//!
//! - [`stepper::StepperPulseGenerator`] - timer-driven step waveform and velocity ramp
//! - [`stepper::PulseSlot`] - single-instance registration for the timer interrupt

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod stepper;
