//! Simulated market: instruments and the bounded random price walk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prices never fall below this floor.
pub const MIN_PRICE: f64 = 0.01;

/// Default bound on a single step, as a fraction (5%).
pub const DEFAULT_MAX_MOVE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    price: f64,
}

impl Instrument {
    pub fn new(symbol: &str, name: &str, price: f64) -> Self {
        Instrument {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: price.max(MIN_PRICE),
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Moves the price by `pct` (a fraction, e.g. -0.05) and clamps to the floor.
    pub fn apply_change(&mut self, pct: f64) {
        self.price = (self.price * (1.0 + pct)).max(MIN_PRICE);
    }
}

/// The fixed instrument set every session starts from.
pub fn seed_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new("INFY", "Infosys", 1500.0),
        Instrument::new("TCS", "Tata Consultancy Services", 3000.0),
        Instrument::new("RELI", "Reliance Industries", 2600.0),
        Instrument::new("HDFC", "HDFC Bank", 1400.0),
        Instrument::new("SBIN", "State Bank of India", 700.0),
    ]
}

/// Owns the tradable instruments and advances their prices.
#[derive(Debug)]
pub struct PriceEngine<R = StdRng> {
    instruments: Vec<Instrument>,
    rng: R,
    max_move: f64,
}

impl PriceEngine<StdRng> {
    /// Seed instruments with a reproducible walk.
    pub fn seeded(seed: u64) -> Self {
        PriceEngine::new(seed_instruments(), StdRng::seed_from_u64(seed))
    }

    /// Seed instruments with an OS-seeded walk.
    pub fn from_entropy() -> Self {
        PriceEngine::new(seed_instruments(), StdRng::from_entropy())
    }
}

impl<R: Rng> PriceEngine<R> {
    pub fn new(instruments: Vec<Instrument>, rng: R) -> Self {
        PriceEngine {
            instruments,
            rng,
            max_move: DEFAULT_MAX_MOVE,
        }
    }

    pub fn with_max_move(mut self, max_move: f64) -> Self {
        self.max_move = max_move.abs();
        self
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn instrument(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    pub fn quote(&self, symbol: &str) -> Option<f64> {
        self.instrument(symbol).map(Instrument::price)
    }

    /// One step of the walk: every instrument gets an independent uniform
    /// draw in `[-max_move, +max_move]`.
    pub fn advance(&mut self) {
        let bound = self.max_move;
        for instrument in &mut self.instruments {
            let pct = if bound > 0.0 {
                self.rng.gen_range(-bound..=bound)
            } else {
                0.0
            };
            instrument.apply_change(pct);
        }
    }
}
