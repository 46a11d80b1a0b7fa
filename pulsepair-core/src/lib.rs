//! Board-agnostic core logic for the mirrored stepper pair firmware
//!
//! This crate contains all logic that does not depend on a specific
//! chip or on the pulse generator's hardware collaborators:
//!
//! - Configuration types, validation and the embedded TOML parser
//! - Motion math (speed clamping, slew limiting, pulse-wait profile, pulse timing)
//! - Ramp strategies driven from the step interrupt
//! - The velocity stepper trait

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod traits;
