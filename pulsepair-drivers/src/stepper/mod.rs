//! Stepper pulse generation

pub mod dispatch;
pub mod pulse_pair;

#[cfg(test)]
pub(crate) mod mock;

pub use dispatch::PulseSlot;
pub use pulse_pair::{PairPins, PulsePhase, StepperPulseGenerator};
