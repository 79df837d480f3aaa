//! Core domain types and logic.

pub mod market;
pub mod position;
pub mod transaction;
pub mod ledger;
pub mod value_history;
pub mod account;
pub mod desk;
pub mod config;
pub mod error;
