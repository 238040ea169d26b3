//! The ledger: a CSV file with one header row and one row per `FinancialRecord`.
//!
//! Columns are `timestamp`, `salary`, one column per category in configured order, then the
//! five derived values. Every append reads the whole file, adds one row and writes the whole
//! file back through a temporary sibling that is renamed into place. Existing rows are carried
//! over unchanged. A file whose header differs from the one the record would produce is
//! rejected as schema drift rather than merged.

use crate::backup::Backup;
use crate::error::PersistenceError;
use crate::model::{
    Amount, Categories, Expense, ExpenseCategory, FinancialRecord, TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;
use csv::StringRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace};

const DERIVED: [&str; 5] = [
    "monthly_expenses",
    "monthly_savings",
    "yearly_net_worth",
    "yearly_expenses",
    "yearly_savings",
];

/// The ledger header for `categories`.
pub fn header(categories: &Categories) -> Vec<String> {
    header_for(categories.iter())
}

fn header_for<'a>(categories: impl Iterator<Item = &'a ExpenseCategory>) -> Vec<String> {
    let mut columns = vec![String::from("timestamp"), String::from("salary")];
    columns.extend(categories.map(|c| c.name().to_string()));
    columns.extend(DERIVED.iter().map(|s| s.to_string()));
    columns
}

/// Appends `record` to the ledger at `path`, creating the file if it does not exist.
pub fn append(record: &FinancialRecord, path: &Path) -> Result<(), PersistenceError> {
    Ledger::new(path).append(record)
}

/// Reads every record from the ledger at `path`. A missing file has no records.
pub fn load(
    path: &Path,
    categories: &Categories,
) -> Result<Vec<FinancialRecord>, PersistenceError> {
    Ledger::new(path).load(categories)
}

/// A ledger file, optionally backed up before each rewrite.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    backup: Option<Backup>,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    /// Copy the existing file with `backup` before every rewrite.
    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` as the last row.
    ///
    /// # Errors
    /// - `SchemaDrift` if the existing header is not the header `record` produces.
    /// - `Corrupt` if the existing file cannot be parsed.
    /// - `Io` or `Backup` if the file system fails; the existing file is left untouched.
    pub fn append(&self, record: &FinancialRecord) -> Result<(), PersistenceError> {
        let expected = header_for(record.expenses().iter().map(|e| &e.category));

        let mut rows = match self.read(&expected)? {
            Some(rows) => {
                debug!(
                    "Appending to {} which has {} existing rows",
                    self.path.display(),
                    rows.len()
                );
                if let Some(backup) = &self.backup {
                    backup
                        .save(&self.path)
                        .map_err(|source| PersistenceError::Backup {
                            path: self.path.clone(),
                            source,
                        })?;
                }
                rows
            }
            None => {
                debug!("Creating a new ledger at {}", self.path.display());
                Vec::new()
            }
        };

        rows.push(StringRecord::from(record.to_row()));
        self.write(&expected, &rows)
    }

    /// Reads every row back into records, checking that the stored derived columns agree with
    /// the stored salary and expenses.
    pub fn load(&self, categories: &Categories) -> Result<Vec<FinancialRecord>, PersistenceError> {
        let expected = header(categories);
        let rows = match self.read(&expected)? {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };
        rows.iter()
            .enumerate()
            // Data starts on line 2.
            .map(|(ix, row)| self.parse_row(categories, row, ix + 2))
            .collect()
    }

    /// Returns `None` if the file does not exist, otherwise all data rows.
    fn read(&self, expected: &[String]) -> Result<Option<Vec<StringRecord>>, PersistenceError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, "read", e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let found: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_error("read", e))?
            .iter()
            .map(|s| s.to_string())
            .collect();

        if found.is_empty() {
            return Err(PersistenceError::corrupt(&self.path, "the header row is missing"));
        }
        if found != expected {
            return Err(PersistenceError::SchemaDrift {
                path: self.path.clone(),
                expected: expected.to_vec(),
                found,
            });
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(result.map_err(|e| self.csv_error("read", e))?);
        }
        trace!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(Some(rows))
    }

    fn write(&self, header: &[String], rows: &[StringRecord]) -> Result<(), PersistenceError> {
        let tmp = self.tmp_path()?;
        let result = write_csv(&tmp, header, rows).and_then(|_| {
            std::fs::rename(&tmp, &self.path)
                .map_err(|e| PersistenceError::io(&self.path, "replace", e))
        });
        if result.is_err() {
            // The original file, if any, is untouched. Leave no partial temp file behind.
            let _ = std::fs::remove_file(&tmp);
        }
        result
    }

    fn tmp_path(&self) -> Result<PathBuf, PersistenceError> {
        let name = self.path.file_name().ok_or_else(|| {
            PersistenceError::corrupt(&self.path, "the ledger path has no file name")
        })?;
        Ok(self
            .path
            .with_file_name(format!(".{}.tmp", name.to_string_lossy())))
    }

    fn parse_row(
        &self,
        categories: &Categories,
        row: &StringRecord,
        line: usize,
    ) -> Result<FinancialRecord, PersistenceError> {
        // The reader rejects rows whose width differs from the header, so indexing is safe.
        let field = |ix: usize| row.get(ix).unwrap_or_default();
        let amount = |ix: usize, column: &str| {
            Amount::from_str(field(ix)).map_err(|e| {
                PersistenceError::corrupt(
                    &self.path,
                    format!("line {line}: invalid {column} '{}': {e}", field(ix)),
                )
            })
        };

        let timestamp = NaiveDateTime::parse_from_str(field(0), TIMESTAMP_FORMAT).map_err(|e| {
            PersistenceError::corrupt(
                &self.path,
                format!("line {line}: invalid timestamp '{}': {e}", field(0)),
            )
        })?;
        let salary = amount(1, "salary")?;

        let mut expenses = Vec::with_capacity(categories.len());
        for (ix, category) in categories.iter().enumerate() {
            expenses.push(Expense {
                category: category.clone(),
                amount: amount(ix + 2, category.name())?,
            });
        }

        let record = FinancialRecord::derive(timestamp, salary, expenses)
            .map_err(|e| PersistenceError::corrupt(&self.path, format!("line {line}: {e}")))?;

        let offset = categories.len() + 2;
        let computed = [
            record.monthly_expenses(),
            record.monthly_savings(),
            record.yearly_net_worth(),
            record.yearly_expenses(),
            record.yearly_savings(),
        ];
        for (ix, (column, value)) in DERIVED.iter().zip(computed).enumerate() {
            let stored = amount(offset + ix, *column)?;
            if stored != value {
                return Err(PersistenceError::corrupt(
                    &self.path,
                    format!(
                        "line {line}: {column} is {} but salary and expenses give {}",
                        stored.plain(),
                        value.plain()
                    ),
                ));
            }
        }

        Ok(record)
    }

    fn csv_error(&self, action: &'static str, e: csv::Error) -> PersistenceError {
        csv_error(&self.path, action, e)
    }
}

fn write_csv(
    path: &Path,
    header: &[String],
    rows: &[StringRecord],
) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, "write", e))?;
    writer
        .write_record(header)
        .map_err(|e| csv_error(path, "write", e))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| csv_error(path, "write", e))?;
    }
    writer
        .flush()
        .map_err(|e| PersistenceError::io(path, "write", e))
}

fn csv_error(path: &Path, action: &'static str, e: csv::Error) -> PersistenceError {
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => PersistenceError::io(path, action, io),
        _ => PersistenceError::corrupt(path, message),
    }
}
