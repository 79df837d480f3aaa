//! Concrete adapter implementations for ports.

pub mod csv_store;
pub mod file_config_adapter;
pub mod system_clock;
