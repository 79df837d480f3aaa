//! CSV file account store.
//!
//! Row-shape faults (too few columns) are skipped; content faults (bad
//! number, timestamp or trade type) fail the whole load for that file.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::domain::config::StoragePaths;
use crate::domain::error::TraderError;
use crate::domain::position::Position;
use crate::domain::transaction::{TradeKind, Transaction};
use crate::domain::value_history::{ValueSnapshot, VALUE_DECIMALS};
use crate::ports::store_port::AccountStore;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PORTFOLIO_HEADER: [&str; 3] = ["ticker", "quantity", "avgCost"];
const TRANSACTIONS_HEADER: [&str; 5] = ["type", "ticker", "qty", "price", "time"];
const HISTORY_HEADER: [&str; 2] = ["time", "value"];
const CASH_HEADER: [&str; 1] = ["cash"];

pub struct CsvStore {
    paths: StoragePaths,
}

impl CsvStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(StoragePaths::in_dir(dir))
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

/// A data row with the file and line it came from, for error reporting.
struct Row<'a> {
    file: &'a str,
    line: u64,
    record: StringRecord,
}

impl Row<'_> {
    fn text(&self, idx: usize) -> &str {
        self.record.get(idx).unwrap_or_default()
    }

    fn parse<T>(&self, idx: usize, column: &str) -> Result<T, TraderError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(idx);
        raw.parse()
            .map_err(|e| self.malformed(format!("invalid {column} '{raw}': {e}")))
    }

    fn amount(&self, idx: usize, column: &str) -> Result<f64, TraderError> {
        let value: f64 = self.parse(idx, column)?;
        if !value.is_finite() || value < 0.0 {
            return Err(self.malformed(format!("invalid {column} '{}'", self.text(idx))));
        }
        Ok(value)
    }

    fn timestamp(&self, idx: usize, column: &str) -> Result<NaiveDateTime, TraderError> {
        let raw = self.text(idx);
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map_err(|e| self.malformed(format!("invalid {column} '{raw}': {e}")))
    }

    fn malformed(&self, reason: String) -> TraderError {
        TraderError::MalformedRow {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }
}

/// Reads every data row with at least `min_fields` columns. A missing file
/// yields no rows.
fn read_rows<T, F>(path: &Path, min_fields: usize, mut convert: F) -> Result<Vec<T>, TraderError>
where
    F: FnMut(&Row<'_>) -> Result<Option<T>, TraderError>,
{
    let file = path.display().to_string();
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(file = %file, "no saved file, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(TraderError::Read {
                file,
                reason: e.to_string(),
            });
        }
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| TraderError::Read {
            file: file.clone(),
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < min_fields {
            debug!(file = %file, line, fields = record.len(), "skipping short row");
            continue;
        }
        let row = Row {
            file: &file,
            line,
            record,
        };
        if let Some(item) = convert(&row)? {
            out.push(item);
        }
    }

    info!(file = %file, rows = out.len(), "loaded");
    Ok(out)
}

/// Replaces the file with `header` followed by `rows`.
fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), TraderError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = path.display().to_string();
    let write_err = |reason: String| TraderError::Write {
        file: file.clone(),
        reason,
    };

    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| write_err(e.to_string()))?;
    wtr.write_record(header)
        .map_err(|e| write_err(e.to_string()))?;
    let mut count = 0usize;
    for row in rows {
        wtr.write_record(&row)
            .map_err(|e| write_err(e.to_string()))?;
        count += 1;
    }
    wtr.flush().map_err(|e| write_err(e.to_string()))?;

    info!(file = %file, rows = count, "saved");
    Ok(())
}

impl AccountStore for CsvStore {
    fn load_cash(&self) -> Result<Option<f64>, TraderError> {
        let rows = read_rows(&self.paths.cash, 1, |row| row.amount(0, "cash").map(Some))?;
        Ok(rows.first().copied())
    }

    fn load_positions(&self) -> Result<Vec<Position>, TraderError> {
        read_rows(&self.paths.portfolio, 3, |row| {
            let symbol = row.text(0);
            let quantity: u32 = row.parse(1, "quantity")?;
            let average_cost = row.amount(2, "avgCost")?;
            if quantity == 0 {
                debug!(symbol, "skipping empty position");
                return Ok(None);
            }
            Ok(Some(Position::new(symbol, quantity, average_cost)))
        })
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, TraderError> {
        read_rows(&self.paths.transactions, 5, |row| {
            let kind: TradeKind = row.parse(0, "type")?;
            let quantity: u32 = row.parse(2, "qty")?;
            if quantity == 0 {
                return Err(row.malformed("qty must be greater than zero".into()));
            }
            Ok(Some(Transaction {
                kind,
                symbol: row.text(1).to_string(),
                quantity,
                price: row.amount(3, "price")?,
                timestamp: row.timestamp(4, "time")?,
            }))
        })
    }

    fn load_history(&self) -> Result<Vec<ValueSnapshot>, TraderError> {
        read_rows(&self.paths.history, 2, |row| {
            let timestamp = row.timestamp(0, "time")?;
            let value: f64 = row.parse(1, "value")?;
            if !value.is_finite() {
                return Err(row.malformed(format!("invalid value '{}'", row.text(1))));
            }
            Ok(Some(ValueSnapshot { timestamp, value }))
        })
    }

    fn save_cash(&self, cash: f64) -> Result<(), TraderError> {
        write_rows(
            &self.paths.cash,
            &CASH_HEADER,
            [vec![format!("{:.*}", VALUE_DECIMALS, cash)]],
        )
    }

    fn save_positions(&self, positions: &[Position]) -> Result<(), TraderError> {
        let rows = positions.iter().filter(|p| p.quantity > 0).map(|p| {
            vec![
                p.symbol.clone(),
                p.quantity.to_string(),
                format!("{:.6}", p.average_cost),
            ]
        });
        write_rows(&self.paths.portfolio, &PORTFOLIO_HEADER, rows)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), TraderError> {
        let rows = transactions.iter().map(|t| {
            vec![
                t.kind.to_string(),
                t.symbol.clone(),
                t.quantity.to_string(),
                format!("{:.2}", t.price),
                t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ]
        });
        write_rows(&self.paths.transactions, &TRANSACTIONS_HEADER, rows)
    }

    fn save_history(&self, snapshots: &[ValueSnapshot]) -> Result<(), TraderError> {
        let rows = snapshots.iter().map(|s| {
            vec![
                s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.*}", VALUE_DECIMALS, s.value),
            ]
        });
        write_rows(&self.paths.history, &HISTORY_HEADER, rows)
    }
}
