//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and holds the ordered list
//! of expense categories, where the ledger lives, and backup settings.

use crate::backup::Backup;
use crate::ledger::Ledger;
use crate::model::Categories;
use crate::notify::Outbox;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const OUTBOX: &str = ".outbox";
const CONFIG_JSON: &str = "config.json";
const EXPENSE_REPORT_CSV: &str = "expense_report.csv";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its backups subdirectory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/fintrack`
    /// - `categories` - The expense categories to track, in column order. `None` uses the
    ///   default set.
    /// - `store_path` - Where the ledger is kept, absolute or relative to `dir`. `None` uses
    ///   `expense_report.csv` inside `dir`.
    ///
    /// # Errors
    /// - Returns an error if a config file already exists or if any file operations fail.
    pub fn create(
        dir: impl Into<PathBuf>,
        categories: Option<Categories>,
        store_path: Option<PathBuf>,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}', refusing to overwrite it",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups)?;

        let config_file = ConfigFile {
            categories: categories.unwrap_or_default(),
            store_path,
            ..ConfigFile::default()
        };
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The fintrack home directory is missing '{}'. Run `fintrack init` first.",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path)?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn categories(&self) -> &Categories {
        &self.config_file.categories
    }

    /// The ledger file. Relative paths in the config file resolve against the home directory.
    pub fn store_path(&self) -> PathBuf {
        match &self.config_file.store_path {
            Some(p) => utils::resolve(&self.root, p),
            None => self.root.join(EXPENSE_REPORT_CSV),
        }
    }

    /// The directory into which notifications are spooled.
    pub fn outbox_path(&self) -> PathBuf {
        match &self.config_file.outbox_path {
            Some(p) => utils::resolve(&self.root, p),
            None => self.root.join(OUTBOX),
        }
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::from_config(self)
    }

    /// The ledger, backed up according to this configuration.
    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.store_path()).with_backup(self.backup())
    }

    pub fn outbox(&self) -> Outbox {
        Outbox::new(self.outbox_path())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "categories": ["rent", "food", "other"],
///   "store_path": "expense_report.csv",
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Expense categories in column order
    #[serde(default)]
    categories: Categories,

    /// Path to the ledger (optional, relative to the home directory or absolute)
    /// Defaults to $FINTRACK_HOME/expense_report.csv if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    store_path: Option<PathBuf>,

    /// Number of backup copies of the ledger to keep, zero disables backups
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Directory for outgoing notifications (optional, relative to the home directory or absolute)
    /// Defaults to $FINTRACK_HOME/.outbox if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outbox_path: Option<PathBuf>,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            categories: Categories::default(),
            store_path: None,
            backup_copies: BACKUP_COPIES,
            outbox_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file. Is a newer version of fintrack available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }
}
