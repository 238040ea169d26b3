//! fintrack computes monthly savings from a salary and a set of categorized expenses, projects
//! them over a year, classifies the result, and keeps every result as a row in an append-only
//! CSV ledger.

pub mod args;
mod backup;
pub mod calculator;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod notify;
mod utils;


pub use backup::Backup;
pub use config::Config;
pub use error::{Error, ErrorType, PersistenceError, Result, ValidationError};
pub use ledger::Ledger;
