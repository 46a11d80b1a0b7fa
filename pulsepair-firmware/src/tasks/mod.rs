//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod control;
pub mod heartbeat;
pub mod sweep;

pub use control::control_task;
pub use heartbeat::heartbeat_task;
pub use sweep::sweep_task;
