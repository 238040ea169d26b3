use crate::error::ValidationError;
use crate::model::{Amount, ExpenseCategory, SALARY};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// The format of the timestamp column, e.g. `2025-03-01 14:05:09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The three-way classification of monthly savings.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Saving,
    BreakingEven,
    Overspending,
}

serde_plain::derive_display_from_serialize!(Status);
serde_plain::derive_fromstr_from_deserialize!(Status);

impl Status {
    /// Classifies by the sign of `monthly_savings`. Exactly zero is `BreakingEven`.
    pub fn classify(monthly_savings: Amount) -> Self {
        if monthly_savings.is_positive() {
            Status::Saving
        } else if monthly_savings.is_zero() {
            Status::BreakingEven
        } else {
            Status::Overspending
        }
    }

    /// The sentence shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Status::Saving => "You're saving monthly and growing well!",
            Status::BreakingEven => "Watch your spending! You're breaking even.",
            Status::Overspending => "Overspending! Consider adjusting your budget.",
        }
    }
}

/// One amount for one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub category: ExpenseCategory,
    pub amount: Amount,
}

/// A fully validated and computed financial snapshot. This is the unit persisted as one ledger
/// row. Records are only built by `calculator::compute` or read back by `ledger::load`, and are
/// never changed afterwards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    salary: Amount,
    /// One entry per configured category, in configured order.
    expenses: Vec<Expense>,
    monthly_expenses: Amount,
    monthly_savings: Amount,
    yearly_net_worth: Amount,
    yearly_expenses: Amount,
    yearly_savings: Amount,
    status: Status,
}

impl FinancialRecord {
    /// Derives every aggregate from `salary` and `expenses`.
    ///
    /// Fails if a total does not fit in an `Amount`. The error names the salary when it alone
    /// overflows, the category whose amount pushes the running sum over, or otherwise the input
    /// with the largest magnitude.
    pub(crate) fn derive(
        timestamp: NaiveDateTime,
        salary: Amount,
        expenses: Vec<Expense>,
    ) -> Result<Self, ValidationError> {
        let yearly_net_worth = salary
            .checked_mul(12)
            .ok_or_else(|| ValidationError::out_of_range(SALARY))?;

        let mut monthly_expenses = Amount::ZERO;
        for expense in &expenses {
            monthly_expenses = monthly_expenses
                .checked_add(expense.amount)
                .ok_or_else(|| ValidationError::out_of_range(expense.category.label()))?;
        }
        let yearly_expenses = monthly_expenses
            .checked_mul(12)
            .ok_or_else(|| largest_input(None, &expenses))?;

        let monthly_savings = salary
            .checked_sub(monthly_expenses)
            .ok_or_else(|| largest_input(Some(salary), &expenses))?;
        let yearly_savings = monthly_savings
            .checked_mul(12)
            .ok_or_else(|| largest_input(Some(salary), &expenses))?;

        Ok(Self {
            // Second precision.
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            salary,
            expenses,
            monthly_expenses,
            monthly_savings,
            yearly_net_worth,
            yearly_expenses,
            yearly_savings,
            status: Status::classify(monthly_savings),
        })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The timestamp as stored, `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn salary(&self) -> Amount {
        self.salary
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// The amount recorded for the category named `name`.
    pub fn expense(&self, name: &str) -> Option<Amount> {
        self.expenses
            .iter()
            .find(|e| e.category.name() == name)
            .map(|e| e.amount)
    }

    pub fn monthly_expenses(&self) -> Amount {
        self.monthly_expenses
    }

    pub fn monthly_savings(&self) -> Amount {
        self.monthly_savings
    }

    pub fn yearly_net_worth(&self) -> Amount {
        self.yearly_net_worth
    }

    pub fn yearly_expenses(&self) -> Amount {
        self.yearly_expenses
    }

    pub fn yearly_savings(&self) -> Amount {
        self.yearly_savings
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The values of this record in ledger column order, formatted for storage.
    pub(crate) fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.expenses.len() + 7);
        row.push(self.timestamp_string());
        row.push(self.salary.plain().to_string());
        row.extend(self.expenses.iter().map(|e| e.amount.plain().to_string()));
        row.extend(
            [
                self.monthly_expenses,
                self.monthly_savings,
                self.yearly_net_worth,
                self.yearly_expenses,
                self.yearly_savings,
            ]
            .iter()
            .map(|a| a.plain().to_string()),
        );
        row
    }
}

/// An out of range error naming the input with the largest magnitude. Earlier inputs win ties,
/// salary first.
fn largest_input(salary: Option<Amount>, expenses: &[Expense]) -> ValidationError {
    let mut field = salary.map(|_| SALARY.to_string());
    let mut largest = salary.map(|s| s.value().abs());
    for expense in expenses {
        let magnitude = expense.amount.value().abs();
        if largest.map_or(true, |l| magnitude > l) {
            largest = Some(magnitude);
            field = Some(expense.category.label());
        }
    }
    ValidationError::out_of_range(field.unwrap_or_else(|| SALARY.to_string()))
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
