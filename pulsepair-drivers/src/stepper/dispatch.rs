//! Interrupt-context access to a single registered generator
//!
//! The timer expiry handler is a plain `fn()`, so it reaches the generator
//! through a static slot. Every access runs inside a critical section,
//! which keeps the timer interrupt out while task code changes the
//! generator state.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use pulsepair_hal::{OutputPin, PeriodicTimer};

use super::pulse_pair::StepperPulseGenerator;

/// Static home for the one generator the timer interrupt drives
pub struct PulseSlot<G> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<G>>>,
}

impl<G> PulseSlot<G> {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install a generator, returning the one it replaces
    pub fn register(&self, generator: G) -> Option<G> {
        self.inner.lock(|cell| cell.replace(Some(generator)))
    }

    /// Remove the generator; later expiries become no-ops
    pub fn take(&self) -> Option<G> {
        self.inner.lock(|cell| cell.take())
    }

    /// Check if a generator is installed
    pub fn is_registered(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }

    /// Run `f` on the generator inside a critical section
    ///
    /// Returns `None` when the slot is empty or already borrowed by a
    /// caller further up the stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut G) -> R) -> Option<R> {
        self.inner.lock(|cell| {
            let mut guard = cell.try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        })
    }
}

impl<G> Default for PulseSlot<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin, T: PeriodicTimer> PulseSlot<StepperPulseGenerator<P, T>> {
    /// Forward a timer expiry to the registered generator
    ///
    /// Returns false when nothing is registered.
    pub fn on_timer_expiry(&self) -> bool {
        self.with(|generator| generator.on_timer_expiry()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::mock::{no_dispatch, rig, MockPin, MockTimer};
    use crate::stepper::pulse_pair::PulsePhase;
    use pulsepair_core::config::StepperPairConfig;
    use pulsepair_core::traits::VelocityStepper;

    type Generator = StepperPulseGenerator<MockPin, MockTimer>;

    static DISPATCHED: PulseSlot<Generator> = PulseSlot::new();

    fn dispatched_expiry() {
        DISPATCHED.on_timer_expiry();
    }

    #[test]
    fn test_empty_slot_ignores_expiry() {
        let slot: PulseSlot<Generator> = PulseSlot::new();
        assert!(!slot.is_registered());
        assert!(!slot.on_timer_expiry());
        assert_eq!(slot.with(|g| g.step_speed()), None);
    }

    #[test]
    fn test_register_and_take() {
        let slot = PulseSlot::new();
        let (pins, timer, _) = rig();
        let generator =
            StepperPulseGenerator::new(pins, timer, &StepperPairConfig::default(), no_dispatch).unwrap();

        assert!(slot.register(generator).is_none());
        assert!(slot.is_registered());
        assert_eq!(slot.with(|g| g.max_speed()), Some(35_000));

        let taken = slot.take();
        assert!(taken.is_some());
        assert!(!slot.is_registered());
        assert!(!slot.on_timer_expiry());
    }

    #[test]
    fn test_nested_access_is_refused() {
        let slot = PulseSlot::new();
        let (pins, timer, _) = rig();
        let generator =
            StepperPulseGenerator::new(pins, timer, &StepperPairConfig::default(), no_dispatch).unwrap();
        slot.register(generator);

        let inner = slot.with(|_| slot.with(|g| g.step_speed()));
        assert_eq!(inner, Some(None));
    }

    #[test]
    fn test_timer_callback_reaches_registered_generator() {
        let (pins, timer, probe) = rig();
        let generator =
            StepperPulseGenerator::new(pins, timer, &StepperPairConfig::default(), dispatched_expiry)
                .unwrap();
        DISPATCHED.register(generator);

        DISPATCHED.with(|g| g.set_velocity(800));
        assert!(probe.step.level());

        let callback = probe.timer.state().callback.unwrap();
        callback();
        assert!(!probe.step.level());
        assert_eq!(DISPATCHED.with(|g| g.phase()), Some(PulsePhase::Low));

        callback();
        assert!(probe.step.level());
        assert_eq!(probe.step.rising_edges(), 2);

        let generator = DISPATCHED.take().unwrap();
        let (_, timer) = generator.release();
        assert!(!timer.is_running());

        callback();
        assert!(!probe.step.level());
    }
}
