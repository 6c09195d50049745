//! Hex color values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BulbError;

/// A `#rrggbb` color normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Pure white, the color a fresh bulb starts with.
    pub const WHITE: &'static str = "#ffffff";

    /// Parses a `#rrggbb` color with hex digits in either case.
    ///
    /// Surrounding whitespace is not accepted; `" #ff0000"` is rejected so
    /// that stored values always round-trip byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::InvalidColor`] when `value` is not `#` followed by
    /// exactly six ASCII hex digits.
    pub fn parse(value: &str) -> Result<Self, BulbError> {
        let digits = value
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| BulbError::invalid_color(value))?;
        Ok(Self(format!("#{}", digits.to_ascii_lowercase())))
    }

    /// Returns the normalised `#rrggbb` text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::from_static(Self::WHITE)
    }
}

impl FromStr for HexColor {
    type Err = BulbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for HexColor {
    type Error = BulbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
