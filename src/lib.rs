//! stockdesk — simulated single-account stock trading desk.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the console driver in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
