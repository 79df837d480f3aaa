//! Driver-facing operations over one market and one account.

use rand::Rng;

use super::account::Account;
use super::error::{TradeRejection, TraderError};
use super::market::{Instrument, PriceEngine};
use super::transaction::{TradeKind, Transaction};
use super::value_history::ValueSnapshot;
use crate::ports::clock_port::ClockPort;
use crate::ports::store_port::AccountStore;

/// An executed trade as reported back to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub kind: TradeKind,
    pub symbol: String,
    pub quantity: u32,
    pub price: f64,
}

impl Fill {
    pub fn value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingRow {
    pub symbol: String,
    pub quantity: u32,
    pub average_cost: f64,
    /// Zero when the symbol is no longer quoted.
    pub price: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub owner: String,
    pub cash: f64,
    pub holdings: Vec<HoldingRow>,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView<'a> {
    pub snapshots: &'a [ValueSnapshot],
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub period_return: Option<f64>,
}

pub struct TradingDesk<R: Rng, C: ClockPort> {
    market: PriceEngine<R>,
    account: Account,
    clock: C,
}

impl<R: Rng, C: ClockPort> TradingDesk<R, C> {
    pub fn new(market: PriceEngine<R>, account: Account, clock: C) -> Self {
        TradingDesk {
            market,
            account,
            clock,
        }
    }

    pub fn market(&self) -> &PriceEngine<R> {
        &self.market
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn list_market(&self) -> &[Instrument] {
        self.market.instruments()
    }

    pub fn refresh_market(&mut self) {
        self.market.advance();
    }

    pub fn buy(&mut self, symbol: &str, quantity: u32) -> Result<Fill, TradeRejection> {
        let price = self.quote(symbol)?;
        let now = self.clock.now();
        self.account.ledger.buy(symbol, quantity, price, now)?;
        Ok(Fill {
            kind: TradeKind::Buy,
            symbol: symbol.to_string(),
            quantity,
            price,
        })
    }

    pub fn sell(&mut self, symbol: &str, quantity: u32) -> Result<Fill, TradeRejection> {
        let price = self.quote(symbol)?;
        let now = self.clock.now();
        self.account.ledger.sell(symbol, quantity, price, now)?;
        Ok(Fill {
            kind: TradeKind::Sell,
            symbol: symbol.to_string(),
            quantity,
            price,
        })
    }

    fn quote(&self, symbol: &str) -> Result<f64, TradeRejection> {
        self.market
            .quote(symbol)
            .ok_or_else(|| TradeRejection::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    pub fn total_value(&self) -> f64 {
        self.account.total_value(&self.market)
    }

    pub fn view_portfolio(&self) -> PortfolioView {
        let holdings = self
            .account
            .ledger
            .positions()
            .iter()
            .map(|p| {
                let price = self.market.quote(&p.symbol).unwrap_or(0.0);
                HoldingRow {
                    symbol: p.symbol.clone(),
                    quantity: p.quantity,
                    average_cost: p.average_cost,
                    price,
                    market_value: p.market_value(price),
                }
            })
            .collect();
        PortfolioView {
            owner: self.account.owner.clone(),
            cash: self.account.ledger.cash(),
            holdings,
            total_value: self.total_value(),
        }
    }

    pub fn view_transactions(&self) -> &[Transaction] {
        self.account.ledger.transactions().as_slice()
    }

    pub fn view_value_history(&self) -> HistoryView<'_> {
        let history = &self.account.history;
        HistoryView {
            snapshots: history.snapshots(),
            start: history.first().map(|s| s.value),
            end: history.last().map(|s| s.value),
            period_return: history.period_return(),
        }
    }

    /// Snapshot of the current total value, stamped with the clock.
    pub fn record_value(&mut self) -> bool {
        let now = self.clock.now();
        self.account.record_value(&self.market, now)
    }

    pub fn save(&self, store: &dyn AccountStore) -> Result<(), TraderError> {
        self.account.save(store)
    }
}
