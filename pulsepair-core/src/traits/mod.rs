//! Hardware abstraction traits
//!
//! These traits define the interface between the control loop and the
//! pulse generator implementation.

pub mod stepper;

pub use stepper::{Direction, VelocityStepper};
