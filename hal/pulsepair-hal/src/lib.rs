//! PulsePair Hardware Abstraction Layer
//!
//! This crate defines the hardware collaborators the step pulse generator
//! depends on. Chip-specific HALs implement them so the generator itself
//! stays board-agnostic and can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pulsepair-drivers (pulse generator)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pulsepair-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pulsepair-hal-│
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Fast digital output level writes
//! - [`timer::PeriodicTimer`] - Interrupt-driven periodic timer

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::{EmbeddedHalOutput, OutputPin};
pub use timer::PeriodicTimer;
