//! Brightness percentage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BulbError;

/// Brightness as an integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest accepted brightness.
    pub const MIN: u8 = 0;
    /// Highest accepted brightness; also the power-on default.
    pub const MAX: u8 = 100;

    /// Validates a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::OutOfRange`] when `value` is negative or above
    /// [`Brightness::MAX`].
    pub fn new(value: i64) -> Result<Self, BulbError> {
        u8::try_from(value)
            .ok()
            .filter(|percent| (Self::MIN..=Self::MAX).contains(percent))
            .map(Self)
            .ok_or(BulbError::out_of_range(value))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = BulbError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}%", self.0)
    }
}
