//! Ledger client core: month budgets, rollover, objectives and the stores
//! they sync with.

pub mod backend;
pub mod config;

pub use backend::{initialize_backend, initialize_offline, AppState};
pub use config::AppConfig;
