//! Step timer on TIMER alarm 1
//!
//! Alarm 0 belongs to the embassy time driver. Alarm 1 raises TIMER_IRQ_1,
//! whose handler runs the registered callback and then re-arms one period
//! after the deadline it just served, so interrupt latency does not
//! stretch the waveform.

use core::cell::Cell;

use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::pac;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use pulsepair_hal::PeriodicTimer;

/// Hardware alarm used for step timing
const ALARM: usize = 1;

/// Shortest interval the alarm is armed for (µs)
pub const MIN_PERIOD_US: u32 = 1;

#[derive(Clone, Copy)]
struct AlarmState {
    callback: Option<fn()>,
    period_us: u32,
    /// Counter value the armed interval ends at
    deadline: u32,
    running: bool,
    /// `begin` or `end` ran since the current expiry was taken
    rescheduled: bool,
}

impl AlarmState {
    const IDLE: Self = Self {
        callback: None,
        period_us: 0,
        deadline: 0,
        running: false,
        rescheduled: false,
    };
}

static STATE: Mutex<CriticalSectionRawMutex, Cell<AlarmState>> = Mutex::new(Cell::new(AlarmState::IDLE));
static TAKEN: AtomicBool = AtomicBool::new(false);

/// Periodic step timer backed by TIMER alarm 1
///
/// There is one alarm, so there is at most one instance.
pub struct AlarmTimer {
    _private: (),
}

impl AlarmTimer {
    /// Claim the alarm and unmask its interrupt
    ///
    /// Returns `None` if the alarm was already claimed.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }

        STATE.lock(|_| disarm());
        interrupt::TIMER_IRQ_1.set_priority(Priority::P1);
        // SAFETY: the handler below only touches state behind the critical-section mutex
        unsafe { interrupt::TIMER_IRQ_1.enable() };

        Some(Self { _private: () })
    }
}

fn now() -> u32 {
    pac::TIMER.timerawl().read()
}

/// Arm the alarm, firing immediately if `deadline` has already passed
fn arm(deadline: u32) {
    pac::TIMER.alarm(ALARM).write_value(deadline);
    if deadline.wrapping_sub(now()) as i32 <= 0 {
        pac::TIMER.armed().write(|w| w.set_armed(1 << ALARM));
        interrupt::TIMER_IRQ_1.pend();
    }
}

fn disarm() {
    pac::TIMER.armed().write(|w| w.set_armed(1 << ALARM));
    pac::TIMER.intr().write(|w| w.set_alarm(ALARM, true));
    interrupt::TIMER_IRQ_1.unpend();
}

impl PeriodicTimer for AlarmTimer {
    fn begin(&mut self, callback: fn(), period_us: u32) {
        STATE.lock(|cell| {
            let period_us = period_us.max(MIN_PERIOD_US);
            let deadline = now().wrapping_add(period_us);
            cell.set(AlarmState {
                callback: Some(callback),
                period_us,
                deadline,
                running: true,
                rescheduled: true,
            });

            disarm();
            pac::TIMER.inte().modify(|w| w.set_alarm(ALARM, true));
            arm(deadline);
        });
    }

    fn update(&mut self, period_us: u32) {
        STATE.lock(|cell| {
            let mut state = cell.get();
            state.period_us = period_us.max(MIN_PERIOD_US);
            cell.set(state);
        });
    }

    fn end(&mut self) {
        STATE.lock(|cell| {
            let mut state = cell.get();
            state.running = false;
            state.rescheduled = true;
            cell.set(state);

            pac::TIMER.inte().modify(|w| w.set_alarm(ALARM, false));
            disarm();
        });
    }

    fn is_running(&self) -> bool {
        STATE.lock(|cell| cell.get().running)
    }
}

#[interrupt]
fn TIMER_IRQ_1() {
    let callback = STATE.lock(|cell| {
        pac::TIMER.intr().write(|w| w.set_alarm(ALARM, true));

        let mut state = cell.get();
        state.rescheduled = false;
        cell.set(state);

        if state.running {
            state.callback
        } else {
            None
        }
    });

    let Some(callback) = callback else {
        return;
    };

    // The callback may update the period or restart/stop the timer
    callback();

    STATE.lock(|cell| {
        let mut state = cell.get();
        if !state.running || state.rescheduled {
            return;
        }

        state.deadline = state.deadline.wrapping_add(state.period_us);
        cell.set(state);
        arm(state.deadline);
    });
}
