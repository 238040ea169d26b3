//! Backup management for the ledger file, taken before every full rewrite.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Creates a new `Backup` instance from a `Config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backups(), config.backup_copies())
    }

    /// Copies `source` into the backups directory.
    ///
    /// The filename format is `{file name}.YYYY-MM-DD-NNN` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files. Returns the path
    /// to the created backup file, or `None` if backups are disabled.
    pub fn save(&self, source: &Path) -> Result<Option<PathBuf>> {
        if self.backup_copies == 0 {
            return Ok(None);
        }
        let prefix = source
            .file_name()
            .with_context(|| format!("Cannot back up '{}', it has no file name", source.display()))?
            .to_string_lossy()
            .to_string();

        utils::make_dir(&self.backups_dir)?;
        let date = today();
        let seq = self.next_sequence_number(&prefix, &date)?;
        let path = self.backups_dir.join(format!("{prefix}.{date}-{seq:03}"));

        utils::copy(source, &path)?;
        debug!("Backed up {} to {}", source.display(), path.display());

        self.rotate(&prefix)?;

        Ok(Some(path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let max_seq = utils::file_names(&self.backups_dir)?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<String> = utils::file_names(&self.backups_dir)?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // Sorts by date and sequence number due to the name format.
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(&self.backups_dir.join(&name))?;
            debug!("Removed old backup {name}");
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    // Pattern: {prefix}.{date}-{NNN}
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    if remainder.is_empty() || !remainder.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    remainder.parse().ok()
}

/// Checks if a filename is a backup of the file named `prefix`.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    let Some(remainder) = filename.strip_prefix(&format!("{prefix}.")) else {
        return false;
    };
    // YYYY-MM-DD-NNN
    match remainder.rsplit_once('-') {
        Some((date, seq)) => {
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
                && !seq.is_empty()
                && seq.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number(
                "expense_report.csv.2025-12-14-001",
                "expense_report.csv",
                "2025-12-14"
            ),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number(
                "expense_report.csv.2025-12-14-042",
                "expense_report.csv",
                "2025-12-14"
            ),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("other.csv.2025-12-14-001", "expense_report.csv", "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number(
                "expense_report.csv.2025-12-13-001",
                "expense_report.csv",
                "2025-12-14"
            ),
            None
        );
        // Trailing junk
        assert_eq!(
            parse_sequence_number(
                "expense_report.csv.2025-12-14-001.tmp",
                "expense_report.csv",
                "2025-12-14"
            ),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file(
            "expense_report.csv.2025-12-14-001",
            "expense_report.csv"
        ));
        assert!(!is_backup_file(
            "expense_report.csv.2025-12-14-001",
            "report.csv"
        ));
        assert!(!is_backup_file("expense_report.csv", "expense_report.csv"));
        assert!(!is_backup_file(
            "expense_report.csv.notes",
            "expense_report.csv"
        ));
    }

    #[test]
    fn test_save_and_rotate() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("ledger.csv");
        utils::write(&source, "a,b\n1,2\n").unwrap();
        let backups = dir.path().join(".backups");
        let backup = Backup::new(&backups, 2);

        let first = backup.save(&source).unwrap().unwrap();
        assert!(first.to_string_lossy().ends_with("-001"));
        assert_eq!(utils::read(&first).unwrap(), "a,b\n1,2\n");

        backup.save(&source).unwrap();
        let third = backup.save(&source).unwrap().unwrap();
        assert!(third.to_string_lossy().ends_with("-003"));

        let mut names = utils::file_names(&backups).unwrap();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("-002"));
        assert!(names[1].ends_with("-003"));
    }

    #[test]
    fn test_zero_copies_disables_backups() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("ledger.csv");
        utils::write(&source, "x").unwrap();
        let backups = dir.path().join(".backups");
        let backup = Backup::new(&backups, 0);
        assert!(backup.save(&source).unwrap().is_none());
        assert!(!backups.exists());
    }
}
