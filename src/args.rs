//! These structs provide the CLI interface for the fintrack CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: work out what you save each month and keep a running report.
///
/// Enter your monthly salary and what you spend in each expense category. fintrack totals your
/// expenses, projects them over a year, tells you whether you are saving, breaking even or
/// overspending, and appends the result as a new row in a CSV report.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. The expense categories you choose here become
    /// the columns of your report, so pick them with care: a report cannot be appended to once
    /// its categories change.
    Init(InitArgs),
    /// Compute this month's figures, print them and append them to the report.
    ///
    /// Every configured category needs a value, even if it is 0.
    ///
    /// Example: fintrack calc --salary 5000 -e rent=1200 -e food=400 ...
    Calc(CalcArgs),
    /// Print the records stored in the report.
    History(HistoryArgs),
    /// Print the configured expense categories.
    Categories,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter docs.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }
}

/// Args for the `fintrack init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// An expense category, e.g. `rent` or `phone_recharged`. Repeat for each category, in the
    /// order you want the report columns. Defaults to: rent, gym, internet, electricity,
    /// transportation, food, phone_recharged, charity, personal_care, other
    #[arg(long = "category", short = 'c')]
    categories: Vec<String>,

    /// Where to keep the report. Relative paths are resolved against the fintrack home.
    /// Defaults to expense_report.csv in the fintrack home.
    #[arg(long)]
    store: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(categories: Vec<String>, store: Option<PathBuf>) -> Self {
        Self { categories, store }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn store(&self) -> Option<&Path> {
        self.store.as_deref()
    }
}

/// Args for the `fintrack calc` command.
#[derive(Debug, Parser, Clone)]
pub struct CalcArgs {
    /// Your monthly salary.
    #[arg(long, short = 's')]
    salary: Option<String>,

    /// A monthly expense as `category=amount`, e.g. `rent=1200`. Repeat for each category.
    #[arg(long = "expense", short = 'e', value_parser = parse_key_value)]
    expenses: Vec<(String, String)>,

    /// Also send the report to this email address.
    #[arg(long)]
    notify: Option<String>,
}

impl CalcArgs {
    pub fn new(
        salary: Option<String>,
        expenses: Vec<(String, String)>,
        notify: Option<String>,
    ) -> Self {
        Self {
            salary,
            expenses,
            notify,
        }
    }

    pub fn salary(&self) -> Option<&str> {
        self.salary.as_deref()
    }

    pub fn expenses(&self) -> &[(String, String)] {
        &self.expenses
    }

    pub fn notify(&self) -> Option<&str> {
        self.notify.as_deref()
    }
}

/// Args for the `fintrack history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Only show the most recent N records.
    #[arg(long)]
    last: Option<usize>,
}

impl HistoryArgs {
    pub fn new(last: Option<usize>) -> Self {
        Self { last }
    }

    pub fn last(&self) -> Option<usize> {
        self.last
    }
}

/// Splits `key=value`. The value is kept as typed so that it can be validated later.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected category=amount, got '{s}'")),
    }
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("rent=1200").unwrap(),
            ("rent".to_string(), "1200".to_string())
        );
        assert_eq!(
            parse_key_value(" food = 12 ").unwrap(),
            ("food".to_string(), " 12 ".to_string())
        );
        assert_eq!(
            parse_key_value("gym=").unwrap(),
            ("gym".to_string(), String::new())
        );
        assert!(parse_key_value("rent").is_err());
        assert!(parse_key_value("=12").is_err());
    }

    #[test]
    fn test_parse_calc() {
        let args = Args::try_parse_from([
            "fintrack",
            "--fintrack-home",
            "/tmp/ft",
            "calc",
            "--salary",
            "5000",
            "-e",
            "rent=1200",
            "--expense",
            "food=300",
            "--notify",
            "me@example.com",
        ])
        .unwrap();
        assert_eq!(args.common().fintrack_home().path(), Path::new("/tmp/ft"));
        match args.command() {
            Command::Calc(calc) => {
                assert_eq!(calc.salary(), Some("5000"));
                assert_eq!(calc.expenses().len(), 2);
                assert_eq!(calc.expenses()[1].0, "food");
                assert_eq!(calc.notify(), Some("me@example.com"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_init() {
        let args =
            Args::try_parse_from(["fintrack", "init", "-c", "rent", "-c", "food", "--store", "r.csv"])
                .unwrap();
        match args.command() {
            Command::Init(init) => {
                assert_eq!(init.categories(), ["rent", "food"]);
                assert_eq!(init.store(), Some(Path::new("r.csv")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_log_level() {
        let args =
            Args::try_parse_from(["fintrack", "--log-level", "debug", "categories"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
