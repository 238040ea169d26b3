use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Categories;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/fintrack`
/// - `args` - The categories to track and, optionally, where to keep the report.
///
/// # Errors
/// - Returns an error if a category name is invalid or repeated.
/// - Returns an error if the directory is already initialized or any file operations fail.
pub fn init(home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let categories = if args.categories().is_empty() {
        None
    } else {
        Some(
            Categories::new(args.categories())
                .context("Invalid expense categories")
                .pub_result(ErrorType::Config)?,
        )
    };

    let config = Config::create(home, categories, args.store().map(Path::to_path_buf))
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;

    let message = format!(
        "Successfully created the fintrack directory at {} tracking {} categories. \
        The report will be kept at {}",
        config.root().display(),
        config.categories().len(),
        config.store_path().display()
    );
    Ok(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_defaults() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ft");
        let out = init(&home, &InitArgs::new(Vec::new(), None)).unwrap();
        assert!(out.message().contains("tracking 10 categories"));
        let config = Config::load(&home).unwrap();
        assert_eq!(config.categories(), &Categories::default());
    }

    #[test]
    fn test_init_custom_categories() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new(
            vec!["rent".to_string(), "car_loan".to_string()],
            Some("ledger.csv".into()),
        );
        init(dir.path(), &args).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.categories().names(), vec!["rent", "car_loan"]);
        assert_eq!(config.store_path(), config.root().join("ledger.csv"));
    }

    #[test]
    fn test_init_bad_category() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new(vec!["Rent".to_string()], None);
        let err = init(dir.path(), &args).unwrap_err();
        assert_eq!(err.to_string(), "config error");
        assert!(!dir.path().join("config.json").exists());
    }
}
