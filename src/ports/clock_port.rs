//! Wall-clock port trait.

use chrono::NaiveDateTime;

pub trait ClockPort {
    /// Local time without offset.
    fn now(&self) -> NaiveDateTime;
}
