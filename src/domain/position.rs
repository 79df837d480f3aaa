//! Held quantity of one instrument and its weighted-average cost.

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: u32,
    pub average_cost: f64,
}

impl Position {
    pub fn new(symbol: &str, quantity: u32, average_cost: f64) -> Self {
        Position {
            symbol: symbol.to_string(),
            quantity,
            average_cost,
        }
    }

    /// Folds a purchase into the cost basis. The caller guarantees the new
    /// quantity fits in a `u32`.
    pub fn add_shares(&mut self, quantity: u32, price: f64) {
        let total_cost =
            self.average_cost * f64::from(self.quantity) + price * f64::from(quantity);
        self.quantity += quantity;
        self.average_cost = total_cost / f64::from(self.quantity);
    }

    /// Removes shares without touching the cost basis. Returns `false` and
    /// leaves the position alone if fewer than `quantity` are held.
    pub fn remove_shares(&mut self, quantity: u32) -> bool {
        if quantity > self.quantity {
            return false;
        }
        self.quantity -= quantity;
        true
    }

    pub fn market_value(&self, price: f64) -> f64 {
        f64::from(self.quantity) * price
    }
}
