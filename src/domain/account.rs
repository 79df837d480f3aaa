//! The account aggregate: ledger plus value history, and its load/save
//! boundary.

use chrono::NaiveDateTime;
use rand::Rng;
use tracing::{info, warn};

use super::error::TraderError;
use super::ledger::Ledger;
use super::market::PriceEngine;
use super::value_history::ValueHistory;
use crate::ports::store_port::AccountStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub owner: String,
    pub ledger: Ledger,
    pub history: ValueHistory,
}

impl Account {
    pub fn new(owner: &str, starting_cash: f64) -> Self {
        Account {
            owner: owner.to_string(),
            ledger: Ledger::new(starting_cash),
            history: ValueHistory::new(),
        }
    }

    /// Loads every part independently. A part that fails to load is reported
    /// in the returned fault list and starts empty (cash falls back to
    /// `starting_cash`).
    pub fn restore(
        owner: &str,
        starting_cash: f64,
        store: &dyn AccountStore,
    ) -> (Self, Vec<TraderError>) {
        let mut faults = Vec::new();

        let cash = match store.load_cash() {
            Ok(Some(cash)) => cash,
            Ok(None) => starting_cash,
            Err(e) => {
                warn!(error = %e, "cash not restored");
                faults.push(e);
                starting_cash
            }
        };
        let positions = store.load_positions().unwrap_or_else(|e| {
            warn!(error = %e, "portfolio not restored");
            faults.push(e);
            Vec::new()
        });
        let transactions = store.load_transactions().unwrap_or_else(|e| {
            warn!(error = %e, "transactions not restored");
            faults.push(e);
            Vec::new()
        });
        let snapshots = store.load_history().unwrap_or_else(|e| {
            warn!(error = %e, "value history not restored");
            faults.push(e);
            Vec::new()
        });

        info!(
            positions = positions.len(),
            transactions = transactions.len(),
            snapshots = snapshots.len(),
            "account restored"
        );

        let account = Account {
            owner: owner.to_string(),
            ledger: Ledger::restore(cash, positions, transactions),
            history: ValueHistory::from_snapshots(snapshots),
        };
        (account, faults)
    }

    /// Rewrites every part. All parts are attempted; the first failure is
    /// returned.
    pub fn save(&self, store: &dyn AccountStore) -> Result<(), TraderError> {
        let results = [
            store.save_positions(self.ledger.positions()),
            store.save_transactions(self.ledger.transactions().as_slice()),
            store.save_history(self.history.snapshots()),
            store.save_cash(self.ledger.cash()),
        ];

        let mut first_err = None;
        for result in results {
            if let Err(e) = result {
                warn!(error = %e, "save failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn total_value<R: Rng>(&self, market: &PriceEngine<R>) -> f64 {
        self.ledger.total_value(|symbol| market.quote(symbol))
    }

    pub fn record_value<R: Rng>(&mut self, market: &PriceEngine<R>, now: NaiveDateTime) -> bool {
        let value = self.total_value(market);
        self.history.record(value, now)
    }
}
