//! Types that represent the core data model, such as `FinancialRecord` and `Categories`.
mod amount;
mod category;
mod raw;
mod record;

pub use amount::{Amount, AmountError, AmountFormat};
pub use category::{Categories, CategoryError, ExpenseCategory, DEFAULT_CATEGORIES};
pub use raw::{RawInput, SALARY};
pub use record::{Expense, FinancialRecord, Status, TIMESTAMP_FORMAT};
