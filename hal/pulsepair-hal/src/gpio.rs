//! GPIO output abstractions
//!
//! Pin writes on the step path must be fast and infallible, so the trait
//! has no error type. Pins from `embedded-hal` drivers can be used through
//! [`EmbeddedHalOutput`] when their error type is [`Infallible`].

use core::convert::Infallible;

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Adapter for infallible `embedded-hal` output pins
///
/// `embedded-hal` only reports the driven level through `&mut self`, so the
/// adapter remembers the last level it wrote.
pub struct EmbeddedHalOutput<P> {
    pin: P,
    high: bool,
}

impl<P> EmbeddedHalOutput<P>
where
    P: embedded_hal::digital::OutputPin<Error = Infallible>,
{
    /// Wrap a pin and drive it to a known initial level
    pub fn new(mut pin: P, initial_high: bool) -> Self {
        settle(if initial_high {
            pin.set_high()
        } else {
            pin.set_low()
        });
        Self {
            pin,
            high: initial_high,
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for EmbeddedHalOutput<P>
where
    P: embedded_hal::digital::OutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        settle(self.pin.set_high());
        self.high = true;
    }

    fn set_low(&mut self) {
        settle(self.pin.set_low());
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

fn settle(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}
