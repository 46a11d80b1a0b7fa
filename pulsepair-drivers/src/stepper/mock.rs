//! Recording pin and timer doubles for host tests

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use pulsepair_hal::{OutputPin, PeriodicTimer};

use super::pulse_pair::PairPins;

/// Output pin that records its level and rising edges
#[derive(Clone, Default)]
pub struct MockPin {
    level: Arc<AtomicBool>,
    rising_edges: Arc<AtomicU32>,
}

impl MockPin {
    pub fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges.load(Ordering::SeqCst)
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        if !self.level.swap(true, Ordering::SeqCst) {
            self.rising_edges.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn set_low(&mut self) {
        self.level.store(false, Ordering::SeqCst);
    }

    fn is_set_high(&self) -> bool {
        self.level()
    }
}

/// Snapshot of the mock timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerState {
    pub running: bool,
    pub period_us: u32,
    pub begins: u32,
    pub callback: Option<fn()>,
}

/// Timer that records calls instead of firing
#[derive(Clone, Default)]
pub struct MockTimer {
    state: Arc<Mutex<TimerState>>,
}

impl MockTimer {
    pub fn state(&self) -> TimerState {
        *self.state.lock().unwrap()
    }
}

impl PeriodicTimer for MockTimer {
    fn begin(&mut self, callback: fn(), period_us: u32) {
        let mut state = self.state.lock().unwrap();
        state.running = true;
        state.period_us = period_us;
        state.begins += 1;
        state.callback = Some(callback);
    }

    fn update(&mut self, period_us: u32) {
        self.state.lock().unwrap().period_us = period_us;
    }

    fn end(&mut self) {
        self.state.lock().unwrap().running = false;
    }

    fn is_running(&self) -> bool {
        self.state().running
    }
}

/// Handles kept by a test after the pins move into a generator
pub struct Probe {
    pub step: MockPin,
    pub dir_a: MockPin,
    pub dir_b: MockPin,
    pub enable_a: MockPin,
    pub enable_b: MockPin,
    pub timer: MockTimer,
}

/// Fresh pins and timer plus probes observing them
pub fn rig() -> (PairPins<MockPin>, MockTimer, Probe) {
    let pins = PairPins {
        step: MockPin::default(),
        dir_a: MockPin::default(),
        dir_b: MockPin::default(),
        enable_a: MockPin::default(),
        enable_b: MockPin::default(),
    };
    let timer = MockTimer::default();
    let probe = Probe {
        step: pins.step.clone(),
        dir_a: pins.dir_a.clone(),
        dir_b: pins.dir_b.clone(),
        enable_a: pins.enable_a.clone(),
        enable_b: pins.enable_b.clone(),
        timer: timer.clone(),
    };
    (pins, timer, probe)
}

/// Expiry handler for generators that are not dispatched through a slot
pub fn no_dispatch() {}
