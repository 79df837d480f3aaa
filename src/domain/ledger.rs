//! Cash, holdings and the trade log, mutated only through buy/sell.
//!
//! Every check runs before the first mutation, so a rejected trade leaves
//! cash, positions and the log exactly as they were.

use chrono::NaiveDateTime;

use super::error::TradeRejection;
use super::position::Position;
use super::transaction::{TradeKind, Transaction, TransactionLog};

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    cash: f64,
    positions: Vec<Position>,
    transactions: TransactionLog,
}

impl Ledger {
    pub fn new(cash: f64) -> Self {
        Ledger {
            cash: cash.max(0.0),
            positions: Vec::new(),
            transactions: TransactionLog::new(),
        }
    }

    /// Rebuilds a ledger from persisted parts. Zero-quantity positions are
    /// dropped; a repeated symbol replaces the earlier entry in place.
    pub fn restore(cash: f64, positions: Vec<Position>, transactions: Vec<Transaction>) -> Self {
        let mut ledger = Ledger::new(cash);
        for position in positions.into_iter().filter(|p| p.quantity > 0) {
            match ledger.position_index(&position.symbol) {
                Some(idx) => ledger.positions[idx] = position,
                None => ledger.positions.push(position),
            }
        }
        ledger.transactions = TransactionLog::from_entries(transactions);
        ledger
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    fn position_index(&self, symbol: &str) -> Option<usize> {
        self.positions.iter().position(|p| p.symbol == symbol)
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: u32,
        price: f64,
        at: NaiveDateTime,
    ) -> Result<(), TradeRejection> {
        if quantity == 0 {
            return Err(TradeRejection::ZeroQuantity);
        }
        let idx = self.position_index(symbol);
        if let Some(i) = idx {
            let held = self.positions[i].quantity;
            if held.checked_add(quantity).is_none() {
                return Err(TradeRejection::PositionLimit {
                    symbol: symbol.to_string(),
                    held,
                    requested: quantity,
                    max: u32::MAX,
                });
            }
        }
        let cost = price * f64::from(quantity);
        if cost > self.cash {
            return Err(TradeRejection::InsufficientCash {
                needed: cost,
                available: self.cash,
            });
        }

        self.cash -= cost;
        match idx {
            Some(i) => self.positions[i].add_shares(quantity, price),
            None => self.positions.push(Position::new(symbol, quantity, price)),
        }
        self.transactions.push(Transaction {
            kind: TradeKind::Buy,
            symbol: symbol.to_string(),
            quantity,
            price,
            timestamp: at,
        });
        Ok(())
    }

    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: u32,
        price: f64,
        at: NaiveDateTime,
    ) -> Result<(), TradeRejection> {
        if quantity == 0 {
            return Err(TradeRejection::ZeroQuantity);
        }
        let idx = self
            .position_index(symbol)
            .ok_or_else(|| TradeRejection::NoPosition {
                symbol: symbol.to_string(),
            })?;
        let held = self.positions[idx].quantity;
        if held < quantity {
            return Err(TradeRejection::InsufficientShares {
                symbol: symbol.to_string(),
                held,
                requested: quantity,
            });
        }

        self.positions[idx].remove_shares(quantity);
        if self.positions[idx].quantity == 0 {
            self.positions.remove(idx);
        }
        self.cash += price * f64::from(quantity);
        self.transactions.push(Transaction {
            kind: TradeKind::Sell,
            symbol: symbol.to_string(),
            quantity,
            price,
            timestamp: at,
        });
        Ok(())
    }

    /// Cash plus holdings at the looked-up prices. A symbol with no price
    /// contributes nothing.
    pub fn total_value<F>(&self, price_lookup: F) -> f64
    where
        F: Fn(&str) -> Option<f64>,
    {
        let holdings: f64 = self
            .positions
            .iter()
            .map(|p| p.market_value(price_lookup(&p.symbol).unwrap_or(0.0)))
            .sum();
        self.cash + holdings
    }
}
