use std::collections::BTreeMap;

/// The key under which the salary is supplied in a `RawInput`.
pub const SALARY: &str = "salary";

/// Unvalidated text as entered by the user, keyed by category identifier plus `salary`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct RawInput {
    values: BTreeMap<String, String>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw salary text.
    pub fn salary(mut self, value: impl Into<String>) -> Self {
        self.values.insert(SALARY.to_string(), value.into());
        self
    }

    /// Sets the raw text for `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
