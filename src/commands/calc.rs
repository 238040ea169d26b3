//! The `calc` command: validate, compute, persist, and optionally notify.

use crate::args::CalcArgs;
use crate::calculator::{compute, summary};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult, PersistenceError};
use crate::model::{FinancialRecord, RawInput};
use crate::notify::{Message, Notifier};
use crate::{Config, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

const SUBJECT: &str = "Financial Report";

/// The outcome of computing and persisting one submission. The record and summary are usable
/// whether or not the ledger write succeeded, so a caller can retry `Ledger::append` without
/// recomputing.
#[derive(Debug)]
pub struct Submission {
    pub record: FinancialRecord,
    pub summary: String,
    pub persisted: std::result::Result<PathBuf, PersistenceError>,
}

/// What `calc` reports on success.
#[derive(Debug, Clone, Serialize)]
pub struct Calculation {
    pub record: FinancialRecord,
    pub store: PathBuf,
    /// Whether a notification was queued. `None` when none was requested.
    pub notified: Option<bool>,
}

/// Computes a record from `raw` using the configured categories and appends it to the
/// configured ledger.
///
/// # Errors
/// - Returns a `ValidationError` (wrapped) if `raw` is incomplete or not numeric. Nothing is
///   written in that case.
///
/// A failed ledger write is not an error here; it is returned in `Submission::persisted`.
pub fn submit(config: &Config, raw: &RawInput, now: NaiveDateTime) -> Result<Submission> {
    let record = compute(raw, config.categories(), now).pub_result(ErrorType::Validation)?;
    let summary = summary(&record);
    let ledger = config.ledger();
    let persisted = ledger
        .append(&record)
        .map(|_| ledger.path().to_path_buf());
    Ok(Submission {
        record,
        summary,
        persisted,
    })
}

/// Handles `fintrack calc`.
///
/// On success the summary is the message. If the ledger write fails, the summary is still
/// printed before the error is returned. A notification is only attempted after a successful
/// write, and its failure is logged without failing the command.
pub fn calc(
    config: &Config,
    args: &CalcArgs,
    notifier: &dyn Notifier,
    now: NaiveDateTime,
) -> Result<Out<Calculation>> {
    let raw = raw_input(args);
    let Submission {
        record,
        summary,
        persisted,
    } = submit(config, &raw, now)?;

    let store = match persisted {
        Ok(store) => store,
        Err(e) => {
            info!("{summary}");
            return Err(e).pub_result(ErrorType::Persistence);
        }
    };

    let notified = args.notify().map(|to| {
        match notifier
            .send(&Message::new(to, SUBJECT, summary.as_str()))
            .pub_result(ErrorType::Notification)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("The report was saved but could not be sent to {to}: {e:#}");
                false
            }
        }
    });

    Ok(Out::new(
        summary,
        Calculation {
            record,
            store,
            notified,
        },
    ))
}

fn raw_input(args: &CalcArgs) -> RawInput {
    let mut raw = RawInput::new();
    if let Some(salary) = args.salary() {
        raw = raw.salary(salary);
    }
    for (key, value) in args.expenses() {
        raw.set(key.as_str(), value.as_str());
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::model::{Status, TIMESTAMP_FORMAT};
    use crate::test::{FailingNotifier, TestEnv};
    use crate::utils;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-03-31 20:00:00", TIMESTAMP_FORMAT).unwrap()
    }

    fn args(salary: &str, expenses: &[(&str, &str)], notify: Option<&str>) -> CalcArgs {
        CalcArgs::new(
            Some(salary.to_string()),
            expenses
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            notify.map(String::from),
        )
    }

    #[test]
    fn test_calc_appends_and_reports() {
        let env = TestEnv::with_categories(&["rent", "food"]);
        let config = env.config();
        let out = calc(
            &config,
            &args("3000", &[("rent", "1200"), ("food", "300")], None),
            &config.outbox(),
            now(),
        )
        .unwrap();

        assert!(out.message().starts_with("Date: 2025-03-31 20:00:00"));
        assert!(out.message().contains("Monthly Savings: $1,500.00"));
        let calculation = out.structure().unwrap();
        assert_eq!(calculation.record.status(), Status::Saving);
        assert_eq!(calculation.store, config.store_path());
        assert_eq!(calculation.notified, None);

        let loaded = config.ledger().load(config.categories()).unwrap();
        assert_eq!(loaded, vec![calculation.record.clone()]);
    }

    #[test]
    fn test_calc_validation_failure_writes_nothing() {
        let env = TestEnv::with_categories(&["rent", "food"]);
        let config = env.config();
        let err = calc(
            &config,
            &args("3000", &[("rent", "1200")], None),
            &config.outbox(),
            now(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "validation error");
        assert_eq!(
            err.downcast_ref::<ValidationError>().unwrap().field(),
            "Food"
        );
        assert!(!config.store_path().exists());
    }

    #[test]
    fn test_submit_keeps_record_on_schema_drift() {
        let env = TestEnv::with_categories(&["rent"]);
        let config = env.config();
        utils::write(config.store_path(), "timestamp,salary,food\n").unwrap();

        let raw = RawInput::new().salary("100").with("rent", "100");
        let submission = submit(&config, &raw, now()).unwrap();
        assert_eq!(submission.record.status(), Status::BreakingEven);
        assert!(submission.summary.contains("breaking even"));
        assert!(submission.persisted.unwrap_err().is_schema_drift());

        let err = calc(
            &config,
            &args("100", &[("rent", "100")], None),
            &config.outbox(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "persistence error");
        assert!(err.downcast_ref::<PersistenceError>().is_some());
    }

    #[test]
    fn test_calc_notifies() {
        let env = TestEnv::with_categories(&["rent"]);
        let config = env.config();
        let out = calc(
            &config,
            &args("100", &[("rent", "10")], Some("me@example.com")),
            &config.outbox(),
            now(),
        )
        .unwrap();
        assert_eq!(out.structure().unwrap().notified, Some(true));
        let names = utils::file_names(&config.outbox_path()).unwrap();
        assert_eq!(names.len(), 1);
        let content = utils::read(&config.outbox_path().join(&names[0])).unwrap();
        assert!(content.contains("Subject: Financial Report"));
        assert!(content.contains("Monthly Savings: $90.00"));
    }

    #[test]
    fn test_notification_failure_does_not_undo_persistence() {
        let env = TestEnv::with_categories(&["rent"]);
        let config = env.config();
        let out = calc(
            &config,
            &args("100", &[("rent", "10")], Some("me@example.com")),
            &FailingNotifier,
            now(),
        )
        .unwrap();
        assert_eq!(out.structure().unwrap().notified, Some(false));
        assert_eq!(config.ledger().load(config.categories()).unwrap().len(), 1);
    }

    #[test]
    fn test_calc_missing_salary() {
        let env = TestEnv::with_categories(&["rent"]);
        let config = env.config();
        let args = CalcArgs::new(None, vec![("rent".into(), "1".into())], None);
        let err = calc(&config, &args, &config.outbox(), now()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>().unwrap().field(),
            "salary"
        );
    }
}
