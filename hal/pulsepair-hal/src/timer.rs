//! Periodic hardware timer abstraction
//!
//! Models a one-channel interval timer whose expiry runs a callback in
//! interrupt context. The callback may change the period of the interval
//! that starts when it returns.

/// Periodic timer with an interrupt-context callback
///
/// Implementations must never block. All methods may be called from inside
/// the callback itself.
pub trait PeriodicTimer {
    /// Start (or restart) the timer
    ///
    /// The first expiry happens `period_us` microseconds from now and
    /// `callback` is invoked on every expiry until [`end`](Self::end).
    fn begin(&mut self, callback: fn(), period_us: u32);

    /// Change the period
    ///
    /// When called from the callback, the new period applies to the
    /// interval that starts at the expiry being handled.
    fn update(&mut self, period_us: u32);

    /// Stop the timer; no further callbacks are delivered
    fn end(&mut self);

    /// Check if the timer is currently running
    fn is_running(&self) -> bool;
}
