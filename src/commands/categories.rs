use crate::commands::Out;
use crate::{Config, Result};

/// Lists the configured categories, in report column order, with their display names.
pub fn categories(config: &Config) -> Result<Out<Vec<String>>> {
    let categories = config.categories();
    let lines: Vec<String> = categories
        .iter()
        .map(|c| format!("{c} ({})", c.label()))
        .collect();
    let message = format!(
        "{} expense categories:\n{}",
        categories.len(),
        lines.join("\n")
    );
    Ok(Out::new(message, categories.names()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_categories() {
        let env = TestEnv::with_categories(&["rent", "phone_recharged"]);
        let out = categories(&env.config()).unwrap();
        assert_eq!(
            out.message(),
            "2 expense categories:\nrent (Rent)\nphone_recharged (Phone Recharged)"
        );
        assert_eq!(
            out.structure().unwrap(),
            &vec!["rent".to_string(), "phone_recharged".to_string()]
        );
    }
}
