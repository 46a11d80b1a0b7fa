//! GPIO outputs for the stepper driver lines

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;
use pulsepair_hal::EmbeddedHalOutput;

/// Output line driven by the pulse generator
pub type PairOutput<'d> = EmbeddedHalOutput<Output<'d>>;

/// Configure a pin as a push-pull output at the given level
pub fn pair_output<'d, P: Pin>(pin: Peri<'d, P>, high: bool) -> PairOutput<'d> {
    let level = if high { Level::High } else { Level::Low };
    EmbeddedHalOutput::new(Output::new(pin, level), high)
}
