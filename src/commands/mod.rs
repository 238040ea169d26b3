//! One handler per `fintrack` subcommand. Each takes a loaded `Config` (except `init`, which
//! creates it) and returns an `Out`.

mod calc;
mod categories;
mod history;
mod init;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use calc::{calc, submit, Calculation, Submission};
pub use categories::categories;
pub use history::history;
pub use init::init;

/// What a fintrack subcommand hands back to `main`: the text shown to the user (the summary for
/// `calc`, one line per record for `history`) and, where there is one, the value behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    message: String,
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Output with text only, e.g. from `init`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Logs the message at `info`. At `--log-level debug` the records behind it are also
    /// logged as JSON, with amounts as plain decimal strings, matching the ledger.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => debug!("Command output:\n\n{json}\n\n"),
                Err(e) => debug!("Command output could not be shown as JSON: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Categories, FinancialRecord, RawInput, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;

    fn record() -> FinancialRecord {
        let categories = Categories::new(["rent"]).unwrap();
        let raw = RawInput::new().salary("2500").with("rent", "900.5");
        let now = NaiveDateTime::parse_from_str("2025-04-30 12:00:00", TIMESTAMP_FORMAT).unwrap();
        crate::calculator::compute(&raw, &categories, now).unwrap()
    }

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "Successfully created".into();
        assert_eq!(out.message(), "Successfully created");
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_out_json_uses_plain_amounts() {
        let out = Out::new("summary", vec![record()]);
        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(json["message"], "summary");
        let first = &json["structure"][0];
        assert_eq!(first["timestamp"], "2025-04-30 12:00:00");
        assert_eq!(first["salary"], "2500");
        assert_eq!(first["monthly_savings"], "1599.5");
        assert_eq!(first["status"], "saving");
        assert_eq!(
            out.structure().unwrap()[0].monthly_expenses(),
            "900.5".parse::<Amount>().unwrap()
        );
    }
}
