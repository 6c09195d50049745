//! Error types for bulb state validation.

use thiserror::Error;

use crate::brightness::Brightness;
use crate::preset::Preset;

/// Errors surfaced when a bulb operation is rejected.
///
/// A rejected operation never mutates the bulb; callers can rely on the state
/// being identical before and after an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulbError {
    /// The supplied color is not a `#rrggbb` hex string.
    #[error("invalid color '{value}': expected a hex color in the form #rrggbb")]
    InvalidColor {
        /// Color text as received.
        value: String,
    },

    /// The supplied brightness lies outside the accepted range.
    #[error(
        "brightness {value} is out of range: must be between {min} and {max}",
        min = Brightness::MIN,
        max = Brightness::MAX
    )]
    OutOfRange {
        /// Brightness value as received.
        value: i64,
    },

    /// The preset name does not match any entry in the preset table.
    #[error("unknown preset '{name}'; available presets: {available}", available = Preset::names().join(", "))]
    UnknownPreset {
        /// Preset name as received.
        name: String,
    },

    /// The state lock was poisoned by a panicking writer.
    #[error("bulb state is unavailable")]
    Poisoned,
}

impl BulbError {
    /// Creates an invalid color error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }

    /// Creates an out of range error.
    #[must_use]
    pub const fn out_of_range(value: i64) -> Self {
        Self::OutOfRange { value }
    }

    /// Creates an unknown preset error.
    pub fn unknown_preset(name: impl Into<String>) -> Self {
        Self::UnknownPreset { name: name.into() }
    }
}
