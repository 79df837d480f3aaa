//! Account persistence port trait.
//!
//! Each part of the account is loaded and saved on its own so a fault in one
//! file does not take the others down with it.

use crate::domain::error::TraderError;
use crate::domain::position::Position;
use crate::domain::transaction::Transaction;
use crate::domain::value_history::ValueSnapshot;

pub trait AccountStore {
    /// `None` when nothing has been saved yet.
    fn load_cash(&self) -> Result<Option<f64>, TraderError>;
    fn load_positions(&self) -> Result<Vec<Position>, TraderError>;
    fn load_transactions(&self) -> Result<Vec<Transaction>, TraderError>;
    fn load_history(&self) -> Result<Vec<ValueSnapshot>, TraderError>;

    fn save_cash(&self, cash: f64) -> Result<(), TraderError>;
    fn save_positions(&self, positions: &[Position]) -> Result<(), TraderError>;
    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), TraderError>;
    fn save_history(&self, snapshots: &[ValueSnapshot]) -> Result<(), TraderError>;
}
