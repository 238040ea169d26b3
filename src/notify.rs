//! Sending a report somewhere other than the terminal.
//!
//! The `Notifier` trait is the seam. `Outbox` implements it by spooling each message as a
//! plain-text file, headers first, into a directory that a mail agent (or a person) can pick up.
//! Whatever the implementation, a failed notification never affects a record that has already
//! been computed and persisted.

use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A message addressed to a single recipient.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Renders the message as headers, a blank line, then the body.
    pub fn render(&self) -> String {
        format!(
            "To: {}\nSubject: {}\nDate: {}\n\n{}\n",
            self.to,
            self.subject,
            Local::now().to_rfc2822(),
            self.body
        )
    }
}

/// Something that can deliver a `Message`.
pub trait Notifier {
    fn send(&self, message: &Message) -> Result<()>;
}

/// A `Notifier` that writes each message to its own file in a directory.
#[derive(Debug, Clone)]
pub struct Outbox {
    dir: PathBuf,
}

impl Outbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The next unused file name, `report.YYYYMMDD-HHMMSS-NNN.txt`.
    fn next_path(&self) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let prefix = format!("report.{stamp}-");
        let max_seq = utils::file_names(&self.dir)?
            .iter()
            .filter_map(|name| {
                name.strip_prefix(&prefix)?
                    .strip_suffix(".txt")?
                    .parse::<u32>()
                    .ok()
            })
            .max()
            .unwrap_or(0);
        Ok(self.dir.join(format!("{prefix}{:03}.txt", max_seq + 1)))
    }
}

impl Notifier for Outbox {
    fn send(&self, message: &Message) -> Result<()> {
        validate_address(&message.to)?;
        utils::make_dir(&self.dir).context("Unable to create the outbox directory")?;
        let path = self.next_path()?;
        utils::write(&path, message.render())?;
        debug!("Queued message to {} at {}", message.to, path.display());
        Ok(())
    }
}

/// A loose sanity check, `local@domain.tld`, with no whitespace.
fn validate_address(address: &str) -> Result<()> {
    let ok = match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !ok {
        bail!("'{address}' is not a valid email address");
    }
    Ok(())
}
