//! Error types for fintrack.
//!
//! Most of the crate passes `anyhow::Error` around. The two failure modes that callers are
//! expected to react to, bad input and a failed ledger write, have their own types so they can
//! be matched on before being turned into an `anyhow::Error`.

use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Raw input was missing, not a number, or a number too large to compute with. Carries the
/// human-readable name of the field, e.g. `salary` or `Phone Recharged`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidationError {
    field: String,
    out_of_range: bool,
}

impl ValidationError {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            out_of_range: false,
        }
    }

    /// The field holds a number, but it or a total derived from it does not fit in an `Amount`.
    pub fn out_of_range(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            out_of_range: true,
        }
    }

    /// The name of the offending field.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_out_of_range(&self) -> bool {
        self.out_of_range
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.out_of_range {
            write!(f, "The value for {} is outside the supported range", self.field)
        } else {
            write!(f, "Missing or non-numeric value for {}", self.field)
        }
    }
}

impl StdError for ValidationError {}

/// The ledger could not be read or written.
#[derive(Debug)]
pub enum PersistenceError {
    /// The file system refused a read, write or rename.
    Io {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },
    /// The existing store could not be parsed as a ledger.
    Corrupt { path: PathBuf, reason: String },
    /// A copy of the existing store could not be taken before rewriting it.
    Backup { path: PathBuf, source: anyhow::Error },
    /// The existing store has a different column set than the configured categories produce.
    SchemaDrift {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl PersistenceError {
    pub(crate) fn io(
        path: impl Into<PathBuf>,
        action: &'static str,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            action,
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Display) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_schema_drift(&self) -> bool {
        matches!(self, Self::SchemaDrift { .. })
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io { path, action, .. } => {
                write!(f, "Unable to {action} {}", path.display())
            }
            PersistenceError::Backup { path, .. } => {
                write!(f, "Unable to back up the ledger at {}", path.display())
            }
            PersistenceError::Corrupt { path, reason } => {
                write!(f, "The ledger at {} is corrupt: {reason}", path.display())
            }
            PersistenceError::SchemaDrift {
                path,
                expected,
                found,
            } => write!(
                f,
                "The columns of the ledger at {} do not match the configured categories. \
                expected [{}], found [{}]",
                path.display(),
                expected.join(", "),
                found.join(", ")
            ),
        }
    }
}

impl StdError for PersistenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceError::Io { source, .. } => Some(source),
            PersistenceError::Backup { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// The broad area in which a command failed. Used to prefix the message shown to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Config,
    Validation,
    Persistence,
    Notification,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// Extension for tagging a result with the `ErrorType` before it leaves a command handler.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            e.context(format!("{error_type} error"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let e = ValidationError::new("Phone Recharged");
        assert_eq!(e.field(), "Phone Recharged");
        assert_eq!(
            e.to_string(),
            "Missing or non-numeric value for Phone Recharged"
        );
        assert!(!e.is_out_of_range());
    }

    #[test]
    fn test_out_of_range_message() {
        let e = ValidationError::out_of_range("salary");
        assert_eq!(e.field(), "salary");
        assert!(e.is_out_of_range());
        assert_eq!(
            e.to_string(),
            "The value for salary is outside the supported range"
        );
    }

    #[test]
    fn test_schema_drift_message() {
        let e = PersistenceError::SchemaDrift {
            path: PathBuf::from("report.csv"),
            expected: vec!["timestamp".into(), "salary".into()],
            found: vec!["timestamp".into()],
        };
        assert!(e.is_schema_drift());
        let msg = e.to_string();
        assert!(msg.contains("expected [timestamp, salary]"));
        assert!(msg.contains("found [timestamp]"));
    }

    #[test]
    fn test_pub_result_prefixes_error_type() {
        let r: std::result::Result<(), ValidationError> = Err(ValidationError::new("salary"));
        let e = r.pub_result(ErrorType::Validation).unwrap_err();
        assert_eq!(e.to_string(), "validation error");
        assert!(e.downcast_ref::<ValidationError>().is_some());
    }
}
