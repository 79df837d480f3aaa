//! CLI definition, dispatch and the interactive menu loop.

use clap::{Parser, Subcommand};
use rand::Rng;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_store::{CsvStore, TIMESTAMP_FORMAT};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::system_clock::SystemClock;
use crate::domain::account::Account;
use crate::domain::config::{build_desk_config, DeskConfig, StoragePaths};
use crate::domain::desk::{HistoryView, PortfolioView, TradingDesk};
use crate::domain::error::TraderError;
use crate::domain::market::{Instrument, PriceEngine};
use crate::domain::transaction::{TradeKind, Transaction};
use crate::ports::clock_port::ClockPort;
use crate::ports::store_port::AccountStore;

#[derive(Parser, Debug)]
#[command(name = "stockdesk", about = "Simulated stock trading desk")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive trading session
    Trade {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Ignore saved state and start from the configured cash
        #[arg(long)]
        fresh: bool,
    },
    /// Print the saved portfolio, transactions and value history
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Trade {
            config,
            data_dir,
            seed,
            fresh,
        } => run_trade(config.as_ref(), data_dir.as_ref(), seed, fresh),
        Command::Show { config, data_dir } => run_show(config.as_ref(), data_dir.as_ref()),
    }
}

/// Reads the config file (if any) and applies command-line overrides.
pub fn resolve_config(
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
    seed: Option<u64>,
) -> Result<DeskConfig, TraderError> {
    let mut config = match config_path {
        Some(path) => {
            let adapter = FileConfigAdapter::from_file(path)?;
            build_desk_config(&adapter)?
        }
        None => DeskConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.storage = StoragePaths::in_dir(dir);
    }
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

pub fn build_market(config: &DeskConfig) -> PriceEngine<StdRng> {
    let engine = match config.seed {
        Some(seed) => PriceEngine::seeded(seed),
        None => PriceEngine::from_entropy(),
    };
    engine.with_max_move(config.max_move_pct / 100.0)
}

/// Restores the account when configured to, reporting per-file faults on
/// stderr. The session continues with whatever loaded.
pub fn open_account(config: &DeskConfig, store: &dyn AccountStore) -> Account {
    if !config.restore {
        return Account::new(&config.owner, config.starting_cash);
    }
    let (account, faults) = Account::restore(&config.owner, config.starting_cash, store);
    for fault in &faults {
        eprintln!("warning: {fault}");
    }
    account
}

fn run_trade(
    config_path: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
    seed: Option<u64>,
    fresh: bool,
) -> ExitCode {
    let mut config = match resolve_config(config_path, data_dir, seed) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if fresh {
        config.restore = false;
    }

    let store = CsvStore::new(config.storage.clone());
    let account = open_account(&config, &store);
    let mut desk = TradingDesk::new(build_market(&config), account, SystemClock);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&mut desk, &store, stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let err = TraderError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn run_show(config_path: Option<&PathBuf>, data_dir: Option<&PathBuf>) -> ExitCode {
    let config = match resolve_config(config_path, data_dir, None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let store = CsvStore::new(config.storage.clone());
    let (account, faults) = Account::restore(&config.owner, config.starting_cash, &store);
    for fault in &faults {
        eprintln!("warning: {fault}");
    }
    let desk = TradingDesk::new(build_market(&config), account, SystemClock);

    let stdout = io::stdout();
    match print_saved(&desk, &mut stdout.lock()) {
        Ok(()) if faults.is_empty() => ExitCode::SUCCESS,
        Ok(()) => (&faults[0]).into(),
        Err(e) => {
            let err = TraderError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn print_saved<R: Rng, C: ClockPort, W: Write>(
    desk: &TradingDesk<R, C>,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "(valued at opening market prices)")?;
    print_portfolio(&desk.view_portfolio(), out)?;
    print_transactions(desk.view_transactions(), out)?;
    print_history(&desk.view_value_history(), out)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantityError {
    #[error("Invalid number.")]
    NotANumber,
    #[error("Quantity must be > 0")]
    NotPositive,
    #[error("Quantity is too large.")]
    TooLarge,
}

/// Validates a typed quantity before it reaches the desk.
pub fn parse_quantity(input: &str) -> Result<u32, QuantityError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| QuantityError::NotANumber)?;
    if value <= 0 {
        return Err(QuantityError::NotPositive);
    }
    u32::try_from(value).map_err(|_| QuantityError::TooLarge)
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    read_line(input)
}

/// The menu loop. A value snapshot is recorded after every iteration,
/// whatever the action. End of input leaves without saving.
pub fn run_session<R, C, I, W>(
    desk: &mut TradingDesk<R, C>,
    store: &dyn AccountStore,
    mut input: I,
    mut out: W,
) -> io::Result<()>
where
    R: Rng,
    C: ClockPort,
    I: BufRead,
    W: Write,
{
    writeln!(out, "Welcome to the Stock Trading Desk (Console)")?;
    loop {
        print_menu(&mut out)?;
        let Some(choice) = prompt(&mut input, &mut out, "Choose an option: ")? else {
            writeln!(out)?;
            break;
        };

        let mut done = false;
        match choice.as_str() {
            "1" => print_market(desk.list_market(), &mut out)?,
            "2" => {
                desk.refresh_market();
                writeln!(out, "Market refreshed.")?;
            }
            "3" => trade_flow(desk, TradeKind::Buy, &mut input, &mut out)?,
            "4" => trade_flow(desk, TradeKind::Sell, &mut input, &mut out)?,
            "5" => print_portfolio(&desk.view_portfolio(), &mut out)?,
            "6" => print_transactions(desk.view_transactions(), &mut out)?,
            "7" => {
                desk.record_value();
                match desk.save(store) {
                    Ok(()) => {
                        writeln!(out, "Saved. Goodbye!")?;
                        done = true;
                    }
                    Err(e) => writeln!(out, "Save failed: {e}. You can try again.")?,
                }
            }
            "8" => print_history(&desk.view_value_history(), &mut out)?,
            _ => writeln!(out, "Invalid choice. Try again.")?,
        }

        desk.record_value();
        if done {
            break;
        }
    }
    Ok(())
}

fn print_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Main Menu ---")?;
    writeln!(out, "1) Show market data")?;
    writeln!(out, "2) Refresh market prices")?;
    writeln!(out, "3) Buy stock")?;
    writeln!(out, "4) Sell stock")?;
    writeln!(out, "5) View portfolio")?;
    writeln!(out, "6) View transactions")?;
    writeln!(out, "7) Save and exit")?;
    writeln!(out, "8) Show portfolio performance history")
}

fn trade_flow<R, C, I, W>(
    desk: &mut TradingDesk<R, C>,
    kind: TradeKind,
    input: &mut I,
    out: &mut W,
) -> io::Result<()>
where
    R: Rng,
    C: ClockPort,
    I: BufRead,
    W: Write,
{
    let verb = match kind {
        TradeKind::Buy => {
            print_market(desk.list_market(), out)?;
            "buy"
        }
        TradeKind::Sell => {
            print_portfolio(&desk.view_portfolio(), out)?;
            "sell"
        }
    };

    let Some(ticker) = prompt(input, out, &format!("Enter ticker to {verb}: "))? else {
        return Ok(());
    };
    let ticker = ticker.to_uppercase();
    let Some(price) = desk.market().quote(&ticker) else {
        writeln!(out, "Ticker not found.")?;
        return Ok(());
    };
    writeln!(out, "Price: {price:.2}")?;

    let Some(raw_qty) = prompt(input, out, &format!("Enter quantity to {verb}: "))? else {
        return Ok(());
    };
    let quantity = match parse_quantity(&raw_qty) {
        Ok(q) => q,
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(());
        }
    };

    let result = match kind {
        TradeKind::Buy => desk.buy(&ticker, quantity),
        TradeKind::Sell => desk.sell(&ticker, quantity),
    };
    match result {
        Ok(fill) => {
            let done = if fill.kind == TradeKind::Buy { "Bought" } else { "Sold" };
            writeln!(
                out,
                "{done} {} of {} at {:.2} (total {:.2})",
                fill.quantity,
                fill.symbol,
                fill.price,
                fill.value()
            )
        }
        Err(rejection) => writeln!(out, "Trade rejected: {rejection}"),
    }
}

pub fn print_market<W: Write>(instruments: &[Instrument], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Market Data (Ticker - Name - Price) ---")?;
    for inst in instruments {
        writeln!(out, "{} ({}) : {:.2}", inst.symbol, inst.name, inst.price())?;
    }
    Ok(())
}

pub fn print_portfolio<W: Write>(view: &PortfolioView, out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Portfolio for {} ---", view.owner)?;
    writeln!(out, "Cash: {:.2}", view.cash)?;
    if view.holdings.is_empty() {
        return writeln!(out, "(No holdings)");
    }
    writeln!(
        out,
        "{:>10} {:>8} {:>10} {:>12} {:>12}",
        "Ticker", "Qty", "AvgCost", "Price", "MarketValue"
    )?;
    for row in &view.holdings {
        writeln!(
            out,
            "{:>10} {:>8} {:>10.2} {:>12.2} {:>12.2}",
            row.symbol, row.quantity, row.average_cost, row.price, row.market_value
        )?;
    }
    writeln!(out, "Total value (cash + holdings): {:.2}", view.total_value)
}

pub fn print_transactions<W: Write>(transactions: &[Transaction], out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Transactions ---")?;
    if transactions.is_empty() {
        return writeln!(out, "(No transactions)");
    }
    writeln!(
        out,
        "{:>6} {:>8} {:>6} {:>10} {:>20}",
        "Type", "Ticker", "Qty", "Price", "Time"
    )?;
    for t in transactions {
        writeln!(
            out,
            "{:>6} {:>8} {:>6} {:>10.2} {:>20}",
            t.kind.as_str(),
            t.symbol,
            t.quantity,
            t.price,
            t.timestamp.format(TIMESTAMP_FORMAT).to_string()
        )?;
    }
    Ok(())
}

pub fn print_history<W: Write>(view: &HistoryView<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out, "\n--- Portfolio Value History ---")?;
    if view.snapshots.is_empty() {
        return writeln!(out, "(no history)");
    }
    writeln!(out, "{:>20} {:>12}", "Time", "Value")?;
    for s in view.snapshots {
        writeln!(
            out,
            "{:>20} {:>12.2}",
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            s.value
        )?;
    }
    let start = view.start.unwrap_or_default();
    let end = view.end.unwrap_or_default();
    let ret = match view.period_return {
        Some(pct) => format!("{pct:.2}%"),
        None => "n/a".to_string(),
    };
    writeln!(out, "\nStart: {start:.2}  End: {end:.2}  Return: {ret}")
}
