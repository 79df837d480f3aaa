//! Time series of total account value.

use chrono::NaiveDateTime;

/// Decimal places kept for account values on disk.
pub const VALUE_DECIMALS: usize = 6;

/// Equal once written with `VALUE_DECIMALS` places.
fn same_when_saved(a: f64, b: f64) -> bool {
    format!("{:.*}", VALUE_DECIMALS, a) == format!("{:.*}", VALUE_DECIMALS, b)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSnapshot {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueHistory {
    snapshots: Vec<ValueSnapshot>,
}

impl ValueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: Vec<ValueSnapshot>) -> Self {
        ValueHistory { snapshots }
    }

    /// Appends a snapshot unless `value` matches the latest one at saved
    /// precision. Returns whether anything was appended.
    pub fn record(&mut self, value: f64, now: NaiveDateTime) -> bool {
        if self
            .snapshots
            .last()
            .is_some_and(|last| same_when_saved(last.value, value))
        {
            return false;
        }
        self.snapshots.push(ValueSnapshot {
            timestamp: now,
            value,
        });
        true
    }

    /// Percentage change from the first to the last snapshot. `None` when
    /// there is no history or the first value is zero.
    pub fn period_return(&self) -> Option<f64> {
        let first = self.snapshots.first()?;
        let last = self.snapshots.last()?;
        if first.value == 0.0 {
            return None;
        }
        Some((last.value - first.value) / first.value * 100.0)
    }

    pub fn snapshots(&self) -> &[ValueSnapshot] {
        &self.snapshots
    }

    pub fn first(&self) -> Option<&ValueSnapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&ValueSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
