//! The minute-aligned probe/publish cycle.
mod scheduler;

pub use scheduler::{CycleState, Scheduler, seconds_until_next_minute};
