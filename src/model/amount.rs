//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Raw user input is parsed
//! strictly (plain or scientific decimal notation only) and values are displayed either for
//! people (`-$60,000.00`) or for storage (`-60000`). Arithmetic is checked and returns `None` on
//! overflow.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts should be written to a `String`.
///
/// # Examples
///  - `AmountFormat::Currency` -> `-$60,000.00`
///  - `AmountFormat::Plain` -> `-60000`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AmountFormat {
    /// Dollar sign, thousands separators and exactly two decimal places.
    #[default]
    Currency,
    /// The exact decimal value with no symbols, as stored in the ledger.
    Plain,
}

/// Represents a monetary amount.
///
/// Arithmetic is exact, so `monthly * 12` never drifts. Formatting does not take part in
/// equality; two amounts are equal when their values are numerically equal.
///
/// # Examples
///
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str(" -1234.5 ").unwrap();
/// assert_eq!(amount.to_string(), "-$1,234.50");
/// assert_eq!(amount.plain().to_string(), "-1234.5");
/// ```
///
/// Currency symbols and separators are not numbers:
/// ```
/// # use fintrack::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("$50.00").is_err());
/// assert!(Amount::from_str("1,000").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value should be written to a `String`.
    format: AmountFormat,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value with currency formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: AmountFormat::Currency,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    /// Returns a copy of this amount that displays as a plain decimal.
    pub fn plain(self) -> Self {
        Self {
            value: self.value,
            format: AmountFormat::Plain,
        }
    }

    /// Returns a copy of this amount that displays as currency.
    pub fn currency(self) -> Self {
        Self {
            value: self.value,
            format: AmountFormat::Currency,
        }
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// `self + rhs`, or `None` if the result does not fit.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_add(rhs.value).map(Amount::new)
    }

    /// `self - rhs`, or `None` if the result does not fit.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_sub(rhs.value).map(Amount::new)
    }

    /// `self * rhs`, or `None` if the result does not fit.
    pub fn checked_mul(self, rhs: u32) -> Option<Amount> {
        self.value.checked_mul(Decimal::from(rhs)).map(Amount::new)
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(Inner);

enum Inner {
    Empty,
    /// Well-formed decimal or scientific notation that `Decimal` cannot hold.
    OutOfRange(rust_decimal::Error),
    Decimal(rust_decimal::Error),
}

impl AmountError {
    /// True when the text is a number, just not one that fits in an `Amount`.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.0, Inner::OutOfRange(_))
    }
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Empty => f.write_str("Empty"),
            Inner::OutOfRange(e) => f.debug_tuple("OutOfRange").field(e).finish(),
            Inner::Decimal(e) => Debug::fmt(e, f),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Empty => f.write_str("an amount cannot be empty"),
            Inner::OutOfRange(e) => write!(f, "the number is outside the supported range: {e}"),
            Inner::Decimal(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.0 {
            Inner::Empty => None,
            Inner::OutOfRange(e) | Inner::Decimal(e) => Some(e),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError(Inner::Empty));
        }

        // Decimal does not accept a leading '+', which plain numeric text may carry.
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let parsed = if unsigned.contains(['e', 'E']) {
            Decimal::from_scientific(unsigned)
        } else {
            Decimal::from_str(unsigned)
        };

        match parsed {
            Ok(value) => Ok(Amount::new(value)),
            Err(e) if is_numeric(unsigned) => Err(AmountError(Inner::OutOfRange(e))),
            Err(e) => Err(AmountError(Inner::Decimal(e))),
        }
    }
}

/// Whether `s` is decimal or scientific notation. Spellings such as `inf` and `NaN`, which
/// `f64` also accepts, are not.
fn is_numeric(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && s.parse::<f64>().is_ok()
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.format {
            AmountFormat::Plain => write!(f, "{}", self.value().normalize()),
            AmountFormat::Currency => {
                let (sign, num) = if self.is_negative() {
                    ("-", self.value().abs())
                } else {
                    ("", self.value())
                };
                write!(
                    f,
                    "{sign}${}",
                    format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
                )
            }
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.plain().to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
