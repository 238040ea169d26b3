//! Turns raw user input into a `FinancialRecord`.
//!
//! Nothing here touches the file system. Given the same input, categories and timestamp,
//! `compute` always produces the same record.

use crate::error::ValidationError;
use crate::model::{Amount, Categories, Expense, FinancialRecord, RawInput, SALARY};
use chrono::NaiveDateTime;
use std::fmt::Write;
use std::str::FromStr;
use tracing::debug;

/// Validates `raw` and derives a record from it.
///
/// The salary is checked first, then each category in configured order. The first missing,
/// blank or non-numeric value stops validation and is reported by name. Negative amounts are
/// accepted. Numbers an `Amount` cannot hold, and inputs whose totals would overflow, are
/// reported as out of range.
pub fn compute(
    raw: &RawInput,
    categories: &Categories,
    now: NaiveDateTime,
) -> Result<FinancialRecord, ValidationError> {
    let salary = parse_field(raw.get(SALARY), SALARY)?;

    let mut expenses = Vec::with_capacity(categories.len());
    for category in categories {
        let amount = parse_field(raw.get(category.name()), &category.label())?;
        expenses.push(Expense {
            category: category.clone(),
            amount,
        });
    }

    let unknown: Vec<&str> = raw
        .keys()
        .filter(|k| *k != SALARY && categories.get(k).is_none())
        .collect();
    if !unknown.is_empty() {
        debug!("Ignoring input for unknown categories: {}", unknown.join(", "));
    }

    let record = FinancialRecord::derive(now, salary, expenses)?;
    debug!(
        "Computed record at {}: monthly savings {}, status {}",
        record.timestamp_string(),
        record.monthly_savings(),
        record.status()
    );
    Ok(record)
}

fn parse_field(value: Option<&str>, field: &str) -> Result<Amount, ValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field));
    }
    Amount::from_str(trimmed).map_err(|e| {
        if e.is_out_of_range() {
            ValidationError::out_of_range(field)
        } else {
            ValidationError::new(field)
        }
    })
}

/// Renders the human-readable report for `record`.
pub fn summary(record: &FinancialRecord) -> String {
    let mut s = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(s, "Date: {}", record.timestamp_string());
    let _ = writeln!(s);
    let _ = writeln!(s, "Monthly Salary: {}", record.salary().currency());
    let _ = writeln!(s, "Monthly Expenses: {}", record.monthly_expenses().currency());
    let _ = writeln!(s, "Monthly Savings: {}", record.monthly_savings().currency());
    let _ = writeln!(s);
    let _ = writeln!(s, "Yearly Projections:");
    let _ = writeln!(s, "- Net Worth: {}", record.yearly_net_worth().currency());
    let _ = writeln!(s, "- Expenses: {}", record.yearly_expenses().currency());
    let _ = writeln!(s, "- Savings: {}", record.yearly_savings().currency());
    let _ = writeln!(s);
    let _ = write!(s, "Status: {}", record.status().message());
    s
}
