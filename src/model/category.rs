use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Column names that the ledger uses for non-category values. A category may not use them.
pub(crate) const RESERVED: [&str; 7] = [
    "timestamp",
    "salary",
    "monthly_expenses",
    "monthly_savings",
    "yearly_net_worth",
    "yearly_expenses",
    "yearly_savings",
];

/// The categories used when none are configured.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "rent",
    "gym",
    "internet",
    "electricity",
    "transportation",
    "food",
    "phone_recharged",
    "charity",
    "personal_care",
    "other",
];

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CategoryError(String);

impl Display for CategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for CategoryError {}

/// An expense bucket such as `rent` or `phone_recharged`. The identifier doubles as the ledger
/// column name, so it is restricted to lowercase ascii alphanumerics and underscores.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct ExpenseCategory(String);

impl ExpenseCategory {
    pub fn new(s: impl Into<String>) -> Result<Self, CategoryError> {
        let s = s.into();
        validate_name(&s)?;
        Ok(Self(s))
    }

    /// The identifier, e.g. `phone_recharged`.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The human-readable name, e.g. `Phone Recharged`.
    pub fn label(&self) -> String {
        self.0
            .split('_')
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl AsRef<str> for ExpenseCategory {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ExpenseCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ExpenseCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ExpenseCategory::new(s).map_err(D::Error::custom)
    }
}

/// The ordered, closed set of categories for a deployment. The order determines both the
/// order in which input is validated and the order of the ledger columns.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Categories {
    items: Vec<ExpenseCategory>,
}

impl Categories {
    pub fn new<S, I>(names: I) -> Result<Self, CategoryError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let items = names
            .into_iter()
            .map(ExpenseCategory::new)
            .collect::<Result<Vec<_>, _>>()?;

        if items.is_empty() {
            return Err(CategoryError(String::from(
                "At least one expense category is required",
            )));
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.name()) {
                return Err(CategoryError(format!(
                    "The category '{item}' is listed more than once"
                )));
            }
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpenseCategory> {
        self.items.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ExpenseCategory> {
        self.items.iter().find(|c| c.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|c| c.name().to_string()).collect()
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            items: DEFAULT_CATEGORIES
                .iter()
                .map(|s| ExpenseCategory(s.to_string()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a ExpenseCategory;
    type IntoIter = std::slice::Iter<'a, ExpenseCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Categories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item.name())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        Categories::new(items).map_err(D::Error::custom)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn validate_name(s: &str) -> Result<(), CategoryError> {
    let mut chars = s.chars();
    match chars.next() {
        None => {
            return Err(CategoryError(String::from(
                "A category name must not be zero length",
            )))
        }
        Some(c) => {
            if !c.is_ascii_lowercase() {
                return Err(CategoryError(format!(
                    "A category name must start with an ascii lowercase letter, \
                    but '{s}' starts with '{c}'"
                )));
            }
        }
    }

    if let Some(bad) = chars.find(|&c| !is_valid_name_char(c)) {
        return Err(CategoryError(format!(
            "A category name must be lowercase ascii alphanumeric with underscores. \
            '{s}' has illegal char '{bad}'"
        )));
    }

    if RESERVED.contains(&s) {
        return Err(CategoryError(format!(
            "'{s}' is a reserved column name and cannot be used as a category"
        )));
    }

    Ok(())
}

fn is_valid_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_digit() || c.is_ascii_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_valid_names() {
        ExpenseCategory::new("rent").unwrap();
        ExpenseCategory::new("phone_recharged").unwrap();
        ExpenseCategory::new("car2").unwrap();
    }

    #[test]
    fn test_invalid_names() {
        assert!(ExpenseCategory::new("").is_err());
        assert!(ExpenseCategory::new("_rent").is_err());
        assert!(ExpenseCategory::new("1rent").is_err());
        assert!(ExpenseCategory::new("Rent").is_err());
        assert!(ExpenseCategory::new("has space").is_err());
        assert!(ExpenseCategory::new("salary").is_err());
        assert!(ExpenseCategory::new("monthly_savings").is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(ExpenseCategory::new("rent").unwrap().label(), "Rent");
        assert_eq!(
            ExpenseCategory::new("phone_recharged").unwrap().label(),
            "Phone Recharged"
        );
        assert_eq!(
            ExpenseCategory::new("personal__care").unwrap().label(),
            "Personal Care"
        );
    }

    #[test]
    fn test_default_categories() {
        let categories = Categories::default();
        assert_eq!(categories.len(), 10);
        assert_eq!(categories.names(), DEFAULT_CATEGORIES.to_vec());
        assert_eq!(
            Categories::new(DEFAULT_CATEGORIES).unwrap(),
            Categories::default()
        );
    }

    #[test]
    fn test_categories_reject_duplicates() {
        let err = Categories::new(["rent", "food", "rent"]).unwrap_err();
        assert!(err.to_string().contains("'rent'"));
    }

    #[test]
    fn test_categories_reject_empty() {
        assert!(Categories::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_categories_keep_order() {
        let categories = Categories::new(["food", "rent", "gym"]).unwrap();
        assert_eq!(categories.names(), vec!["food", "rent", "gym"]);
        assert_eq!(categories.get("rent").unwrap().name(), "rent");
        assert!(categories.get("charity").is_none());
    }

    #[test]
    fn test_categories_serde() {
        let original_json = r#"["rent","phone_recharged","other"]"#;
        let categories: Categories = serde_json::from_str(original_json).unwrap();
        let serialized = serde_json::to_string(&categories).unwrap();
        assert_eq!(original_json, serialized);

        assert!(serde_json::from_str::<Categories>(r#"["Rent"]"#).is_err());
    }
}
