//! Desk settings read through the config port, with defaults and validation.

use std::path::PathBuf;

use super::error::TraderError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_OWNER: &str = "InternTrader";
pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;
pub const DEFAULT_MAX_MOVE_PCT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StoragePaths {
    pub portfolio: PathBuf,
    pub transactions: PathBuf,
    pub history: PathBuf,
    pub cash: PathBuf,
}

impl StoragePaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        StoragePaths {
            portfolio: dir.join("portfolio.csv"),
            transactions: dir.join("transactions.csv"),
            history: dir.join("value_history.csv"),
            cash: dir.join("account.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    pub owner: String,
    pub starting_cash: f64,
    /// Step bound as a percentage, e.g. 5.0 for ±5%.
    pub max_move_pct: f64,
    pub seed: Option<u64>,
    /// Load persisted state at startup.
    pub restore: bool,
    pub storage: StoragePaths,
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            owner: DEFAULT_OWNER.to_string(),
            starting_cash: DEFAULT_STARTING_CASH,
            max_move_pct: DEFAULT_MAX_MOVE_PCT,
            seed: None,
            restore: true,
            storage: StoragePaths::in_dir("."),
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn number(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TraderError> {
    adapter
        .get_double(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|raw| invalid(section, key, format!("'{raw}' is not a number")))
}

pub fn build_desk_config(adapter: &dyn ConfigPort) -> Result<DeskConfig, TraderError> {
    let owner = adapter
        .get_string("account", "owner")
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let starting_cash = number(adapter, "account", "starting_cash", DEFAULT_STARTING_CASH)?;
    if !starting_cash.is_finite() || starting_cash < 0.0 {
        return Err(invalid("account", "starting_cash", "must be a non-negative amount"));
    }

    let max_move_pct = number(adapter, "market", "max_move_pct", DEFAULT_MAX_MOVE_PCT)?;
    if !(max_move_pct > 0.0 && max_move_pct < 100.0) {
        return Err(invalid("market", "max_move_pct", "must be between 0 and 100"));
    }

    let seed = adapter
        .get_string("market", "seed")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| invalid("market", "seed", format!("'{raw}' is not an integer")))
        })
        .transpose()?;

    let restore = adapter
        .get_bool("account", "restore")
        .map_err(|raw| invalid("account", "restore", format!("'{raw}' is not true or false")))?
        .unwrap_or(true);

    let data_dir = adapter
        .get_string("storage", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let defaults = StoragePaths::in_dir(&data_dir);
    let file = |key: &str, default: PathBuf| {
        adapter
            .get_string("storage", key)
            .map(|name| PathBuf::from(&data_dir).join(name))
            .unwrap_or(default)
    };
    let storage = StoragePaths {
        portfolio: file("portfolio_file", defaults.portfolio.clone()),
        transactions: file("transactions_file", defaults.transactions.clone()),
        history: file("history_file", defaults.history.clone()),
        cash: file("cash_file", defaults.cash.clone()),
    };

    Ok(DeskConfig {
        owner,
        starting_cash,
        max_move_pct,
        seed,
        restore,
        storage,
    })
}
