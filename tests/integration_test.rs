//! Integration tests.
//!
//! Tests cover:
//! - Account restore with per-file fault isolation (MemoryStore)
//! - Save/restore round trip through CsvStore on disk
//! - The interactive menu loop driven by scripted input
//! - Accounting properties through the driver-facing desk

mod common;

use approx::assert_relative_eq;
use common::*;
use rand::rngs::StdRng;
use stockdesk::adapters::csv_store::CsvStore;
use stockdesk::cli::run_session;
use stockdesk::domain::account::Account;
use stockdesk::domain::desk::TradingDesk;
use stockdesk::domain::error::{TradeRejection, TraderError};
use stockdesk::domain::market::PriceEngine;
use stockdesk::domain::position::Position;
use stockdesk::domain::transaction::TradeKind;
use stockdesk::ports::store_port::AccountStore;
use tempfile::TempDir;

fn desk_with(account: Account) -> TradingDesk<StdRng, TickingClock> {
    TradingDesk::new(
        PriceEngine::seeded(3),
        account,
        TickingClock::starting_at(datetime(2024, 1, 15, 9, 0, 0)),
    )
}

fn fresh_desk() -> TradingDesk<StdRng, TickingClock> {
    desk_with(Account::new("InternTrader", 10_000.0))
}

fn session(desk: &mut TradingDesk<StdRng, TickingClock>, store: &dyn AccountStore, script: &str) -> String {
    let mut out = Vec::new();
    run_session(desk, store, script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

mod restore_and_save {
    use super::*;

    #[test]
    fn restore_uses_saved_parts() {
        let store = MemoryStore::new()
            .with_cash(420.0)
            .with_positions(vec![Position::new("INFY", 3, 1480.0)])
            .with_history(vec![snapshot(10_000.0, 0), snapshot(9_900.0, 1)]);

        let (account, faults) = Account::restore("InternTrader", 10_000.0, &store);
        assert!(faults.is_empty());
        assert_relative_eq!(account.ledger.cash(), 420.0);
        assert_eq!(account.ledger.positions(), &[Position::new("INFY", 3, 1480.0)]);
        assert_eq!(account.history.len(), 2);
    }

    #[test]
    fn faulty_part_starts_empty_and_others_load() {
        let store = MemoryStore::new()
            .with_cash(500.0)
            .with_positions(vec![Position::new("TCS", 1, 3000.0)])
            .with_history(vec![snapshot(10_000.0, 0)])
            .failing_on("positions");

        let (account, faults) = Account::restore("InternTrader", 10_000.0, &store);
        assert_eq!(faults.len(), 1);
        assert!(matches!(faults[0], TraderError::MalformedRow { .. }));
        assert!(account.ledger.positions().is_empty());
        assert_relative_eq!(account.ledger.cash(), 500.0);
        assert_eq!(account.history.len(), 1);
    }

    #[test]
    fn faulty_cash_falls_back_to_starting_cash() {
        let store = MemoryStore::new().with_cash(1.0).failing_on("cash");
        let (account, faults) = Account::restore("InternTrader", 10_000.0, &store);
        assert_eq!(faults.len(), 1);
        assert_relative_eq!(account.ledger.cash(), 10_000.0);
    }

    #[test]
    fn save_attempts_every_part_and_reports_failure() {
        let store = MemoryStore::new().failing_on("transactions");
        let mut desk = fresh_desk();
        desk.buy("SBIN", 2).unwrap();

        assert!(desk.save(&store).is_err());
        assert_eq!(store.positions.borrow().len(), 1);
        assert_eq!(*store.cash.borrow(), Some(8600.0));
        assert!(store.transactions.borrow().is_empty());
    }

    #[test]
    fn csv_round_trip_restores_account() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::in_dir(dir.path());

        let mut desk = fresh_desk();
        desk.record_value();
        desk.buy("INFY", 3).unwrap();
        desk.buy("SBIN", 5).unwrap();
        desk.refresh_market();
        desk.sell("SBIN", 2).unwrap();
        desk.record_value();
        desk.save(&store).unwrap();

        let (restored, faults) = Account::restore("InternTrader", 10_000.0, &store);
        assert!(faults.is_empty());

        let original = desk.account();
        assert_relative_eq!(
            restored.ledger.cash(),
            original.ledger.cash(),
            epsilon = 1e-6
        );
        let symbols: Vec<&str> = restored
            .ledger
            .positions()
            .iter()
            .map(|p| p.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["INFY", "SBIN"]);
        assert_eq!(restored.ledger.position("SBIN").unwrap().quantity, 3);

        let kinds: Vec<TradeKind> = restored.ledger.transactions().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TradeKind::Buy, TradeKind::Buy, TradeKind::Sell]);
        assert_eq!(
            restored.ledger.transactions().as_slice()[0].timestamp,
            original.ledger.transactions().as_slice()[0].timestamp
        );
        assert_eq!(restored.history.len(), original.history.len());
    }

    #[test]
    fn fractional_cost_round_trips_with_six_digits() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::in_dir(dir.path());
        let account = Account {
            owner: "InternTrader".into(),
            ledger: stockdesk::domain::ledger::Ledger::restore(
                0.0,
                vec![Position::new("INFY", 12, 1523.456789)],
                Vec::new(),
            ),
            history: Default::default(),
        };
        account.save(&store).unwrap();

        let (restored, _) = Account::restore("InternTrader", 10_000.0, &store);
        let pos = restored.ledger.position("INFY").unwrap();
        assert_eq!(pos.quantity, 12);
        assert_eq!(format!("{:.6}", pos.average_cost), "1523.456789");
    }

    #[test]
    fn reload_does_not_duplicate_unchanged_value() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::in_dir(dir.path());
        let market = PriceEngine::seeded(1);
        let mut account = Account {
            owner: "InternTrader".into(),
            ledger: stockdesk::domain::ledger::Ledger::restore(
                8_523.4567891234,
                vec![Position::new("SBIN", 3, 701.123456789)],
                Vec::new(),
            ),
            history: Default::default(),
        };
        assert!(account.record_value(&market, datetime(2024, 1, 15, 9, 0, 0)));
        account.save(&store).unwrap();

        let (mut restored, faults) = Account::restore("InternTrader", 10_000.0, &store);
        assert!(faults.is_empty());
        assert!(!restored.record_value(&market, datetime(2024, 1, 15, 9, 5, 0)));
        assert_eq!(restored.history.len(), 1);
    }
}

mod menu_session {
    use super::*;

    #[test]
    fn buy_sell_save_and_exit() {
        let store = MemoryStore::new();
        let mut desk = fresh_desk();
        let output = session(&mut desk, &store, "3\ninfy\n2\n4\nINFY\n1\n7\n");

        assert!(output.contains("Price: 1500.00"), "{output}");
        assert!(output.contains("Bought 2 of INFY at 1500.00"), "{output}");
        assert!(output.contains("Sold 1 of INFY at 1500.00"), "{output}");
        assert!(output.contains("Saved. Goodbye!"), "{output}");

        assert_eq!(
            store.positions.borrow().as_slice(),
            &[Position::new("INFY", 1, 1500.0)]
        );
        assert_eq!(store.transactions.borrow().len(), 2);
        assert_eq!(*store.cash.borrow(), Some(8500.0));
        // Prices never moved, so the total stayed at 10000.
        assert_eq!(store.history.borrow().len(), 1);
    }

    #[test]
    fn input_errors_never_reach_the_ledger() {
        let store = MemoryStore::new();
        let mut desk = fresh_desk();
        let output = session(
            &mut desk,
            &store,
            "3\nINFY\nabc\n3\nXYZ\n3\nINFY\n0\n4\nTCS\n1\n9\n",
        );

        assert!(output.contains("Invalid number."), "{output}");
        assert!(output.contains("Ticker not found."), "{output}");
        assert!(output.contains("Quantity must be > 0"), "{output}");
        assert!(output.contains("Trade rejected: no position in TCS"), "{output}");
        assert!(output.contains("Invalid choice. Try again."), "{output}");
        assert!(desk.view_transactions().is_empty());
        // End of input exits without saving.
        assert_eq!(*store.cash.borrow(), None);
    }

    #[test]
    fn insufficient_cash_is_reported() {
        let store = MemoryStore::new();
        let mut desk = fresh_desk();
        let output = session(&mut desk, &store, "3\nTCS\n4\n");
        assert!(
            output.contains("Trade rejected: insufficient cash: need 12000.00, have 10000.00"),
            "{output}"
        );
        assert_relative_eq!(desk.account().ledger.cash(), 10_000.0);
    }

    #[test]
    fn failed_save_keeps_the_session_running() {
        let store = MemoryStore::new().failing_on("history");
        let mut desk = fresh_desk();
        let output = session(&mut desk, &store, "7\n5\n");

        assert!(output.contains("Save failed"), "{output}");
        assert!(!output.contains("Saved. Goodbye!"), "{output}");
        assert!(output.contains("--- Portfolio for InternTrader ---"), "{output}");
    }

    #[test]
    fn every_iteration_records_a_snapshot() {
        let store = MemoryStore::new();
        let mut desk = fresh_desk();
        session(&mut desk, &store, "1\n6\n2\n8\n");

        let history = desk.view_value_history();
        assert!(!history.snapshots.is_empty());
        assert_eq!(history.start, Some(10_000.0));
        assert!(history.period_return.is_some());
    }

    #[test]
    fn history_view_prints_return() {
        let store = MemoryStore::new();
        let mut desk = fresh_desk();
        let output = session(&mut desk, &store, "1\n8\n");
        assert!(output.contains("Return: 0.00%"), "{output}");
    }
}

mod accounting_properties {
    use super::*;

    #[test]
    fn weighted_average_through_desk() {
        let mut desk = desk_with(Account::new("InternTrader", 1_000_000.0));
        desk.buy("INFY", 10).unwrap();
        let first = desk.market().quote("INFY").unwrap();
        desk.refresh_market();
        let second = desk.market().quote("INFY").unwrap();
        desk.buy("INFY", 10).unwrap();

        let pos = desk.account().ledger.position("INFY").unwrap();
        assert_eq!(pos.quantity, 20);
        assert_relative_eq!(pos.average_cost, (first + second) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn rejected_buy_leaves_everything_unchanged() {
        let mut desk = desk_with(Account::new("InternTrader", 100.0));
        let before = desk.account().clone();
        assert!(matches!(
            desk.buy("SBIN", 1),
            Err(TradeRejection::InsufficientCash { .. })
        ));
        assert_eq!(desk.account(), &before);
    }

    #[test]
    fn transactions_are_stamped_in_order() {
        let mut desk = fresh_desk();
        desk.buy("SBIN", 1).unwrap();
        desk.buy("HDFC", 1).unwrap();
        desk.sell("SBIN", 1).unwrap();

        let times: Vec<_> = desk.view_transactions().iter().map(|t| t.timestamp).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(desk.account().ledger.position("SBIN").is_none());
    }

    #[test]
    fn prices_stay_above_floor_over_long_walks() {
        let mut desk = fresh_desk();
        for _ in 0..2000 {
            desk.refresh_market();
        }
        assert!(desk.list_market().iter().all(|i| i.price() >= 0.01));
    }
}
