#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};
use stockdesk::domain::error::TraderError;
use stockdesk::domain::position::Position;
use stockdesk::domain::transaction::Transaction;
use stockdesk::domain::value_history::ValueSnapshot;
use stockdesk::ports::clock_port::ClockPort;
use stockdesk::ports::store_port::AccountStore;

/// In-memory store. Parts listed in `failing` error on load and save.
#[derive(Default)]
pub struct MemoryStore {
    pub cash: RefCell<Option<f64>>,
    pub positions: RefCell<Vec<Position>>,
    pub transactions: RefCell<Vec<Transaction>>,
    pub history: RefCell<Vec<ValueSnapshot>>,
    pub failing: Vec<&'static str>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cash(self, cash: f64) -> Self {
        *self.cash.borrow_mut() = Some(cash);
        self
    }

    pub fn with_positions(self, positions: Vec<Position>) -> Self {
        *self.positions.borrow_mut() = positions;
        self
    }

    pub fn with_history(self, history: Vec<ValueSnapshot>) -> Self {
        *self.history.borrow_mut() = history;
        self
    }

    pub fn failing_on(mut self, part: &'static str) -> Self {
        self.failing.push(part);
        self
    }

    fn check(&self, part: &str) -> Result<(), TraderError> {
        if self.failing.iter().any(|f| *f == part) {
            return Err(TraderError::MalformedRow {
                file: format!("{part}.csv"),
                line: 2,
                reason: "injected fault".into(),
            });
        }
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn load_cash(&self) -> Result<Option<f64>, TraderError> {
        self.check("cash")?;
        Ok(*self.cash.borrow())
    }

    fn load_positions(&self) -> Result<Vec<Position>, TraderError> {
        self.check("positions")?;
        Ok(self.positions.borrow().clone())
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, TraderError> {
        self.check("transactions")?;
        Ok(self.transactions.borrow().clone())
    }

    fn load_history(&self) -> Result<Vec<ValueSnapshot>, TraderError> {
        self.check("history")?;
        Ok(self.history.borrow().clone())
    }

    fn save_cash(&self, cash: f64) -> Result<(), TraderError> {
        self.check("cash")?;
        *self.cash.borrow_mut() = Some(cash);
        Ok(())
    }

    fn save_positions(&self, positions: &[Position]) -> Result<(), TraderError> {
        self.check("positions")?;
        *self.positions.borrow_mut() = positions.to_vec();
        Ok(())
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), TraderError> {
        self.check("transactions")?;
        *self.transactions.borrow_mut() = transactions.to_vec();
        Ok(())
    }

    fn save_history(&self, snapshots: &[ValueSnapshot]) -> Result<(), TraderError> {
        self.check("history")?;
        *self.history.borrow_mut() = snapshots.to_vec();
        Ok(())
    }
}

/// Clock that advances one second on every reading.
pub struct TickingClock {
    next: Cell<NaiveDateTime>,
}

impl TickingClock {
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            next: Cell::new(start),
        }
    }
}

impl ClockPort for TickingClock {
    fn now(&self) -> NaiveDateTime {
        let now = self.next.get();
        self.next.set(now + chrono::Duration::seconds(1));
        now
    }
}

pub fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub fn snapshot(value: f64, minute: u32) -> ValueSnapshot {
    ValueSnapshot {
        timestamp: datetime(2024, 1, 15, 9, minute, 0),
        value,
    }
}
