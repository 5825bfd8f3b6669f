//! A single-user library ledger: books, users and loans kept in SQLite.

pub mod config;
pub mod ledger;
pub mod menu;
pub mod prompt;
pub mod sql;
pub mod table;
pub mod time;
pub mod types;

pub use ledger::Ledger;
pub use types::LedgerError;
