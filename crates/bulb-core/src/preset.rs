//! Fixed table of named color presets.

use std::fmt;

use crate::color::HexColor;
use crate::error::BulbError;

/// Named shortcut for a fixed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// `#ffffff`
    White,
    /// `#ff0000`
    Red,
    /// `#00ff00`
    Green,
    /// `#0000ff`
    Blue,
    /// `#ffff00`
    Yellow,
    /// `#ff00ff`
    Magenta,
    /// `#00ffff`
    Cyan,
    /// `#ffa500`
    Orange,
}

impl Preset {
    /// Every preset in catalogue order.
    pub const ALL: [Self; 8] = [
        Self::White,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Magenta,
        Self::Cyan,
        Self::Orange,
    ];

    /// Looks a preset up by name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::UnknownPreset`] when no preset carries `name`.
    pub fn lookup(name: &str) -> Result<Self, BulbError> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BulbError::unknown_preset(name))
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::Orange => "orange",
        }
    }

    /// Canonical `#rrggbb` value.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::White => HexColor::WHITE,
            Self::Red => "#ff0000",
            Self::Green => "#00ff00",
            Self::Blue => "#0000ff",
            Self::Yellow => "#ffff00",
            Self::Magenta => "#ff00ff",
            Self::Cyan => "#00ffff",
            Self::Orange => "#ffa500",
        }
    }

    /// Color the preset resolves to.
    #[must_use]
    pub fn color(self) -> HexColor {
        HexColor::from_static(self.hex())
    }

    /// Names of every preset, in catalogue order.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.into_iter().map(Self::name).collect()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}
