//! Local wall clock.

use chrono::{Local, NaiveDateTime, Timelike};

use crate::ports::clock_port::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    /// Truncated to whole seconds, the resolution of the persisted format.
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}
