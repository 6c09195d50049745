//! The bulb record and its validated mutations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::brightness::Brightness;
use crate::color::HexColor;
use crate::error::BulbError;
use crate::preset::Preset;

/// Power, color and brightness of the simulated bulb.
///
/// Field types carry their own validation, so a `BulbState` is always fully
/// defined and within range. Each mutation either succeeds or leaves the
/// state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulbState {
    /// Whether the bulb is lit.
    pub on: bool,
    /// Current color.
    pub color: HexColor,
    /// Current brightness.
    pub brightness: Brightness,
}

impl BulbState {
    /// Flips the power flag and returns the new value.
    pub const fn toggle_power(&mut self) -> bool {
        self.on = !self.on;
        self.on
    }

    /// Sets the color from `#rrggbb` text.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::InvalidColor`] without touching the state when the
    /// text is not a hex color.
    pub fn set_color(&mut self, value: &str) -> Result<(), BulbError> {
        self.color = HexColor::parse(value)?;
        Ok(())
    }

    /// Sets the brightness percentage.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::OutOfRange`] without touching the state when the
    /// value lies outside `0..=100`.
    pub fn set_brightness(&mut self, value: i64) -> Result<(), BulbError> {
        self.brightness = Brightness::new(value)?;
        Ok(())
    }

    /// Applies a named preset and returns the resolved entry.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::UnknownPreset`] without touching the state when
    /// the name is not in the preset table.
    pub fn apply_preset(&mut self, name: &str) -> Result<Preset, BulbError> {
        let preset = Preset::lookup(name)?;
        self.color = preset.color();
        Ok(preset)
    }

    /// `"on"` or `"off"`.
    #[must_use]
    pub const fn power_label(&self) -> &'static str {
        if self.on { "on" } else { "off" }
    }
}

impl fmt::Display for BulbState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "- Power: {}", self.power_label())?;
        writeln!(formatter, "- Color: {}", self.color)?;
        write!(formatter, "- Brightness: {}", self.brightness)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn state() -> BulbState {
        BulbState::default()
    }

    #[rstest]
    fn defaults_match_a_fresh_bulb(state: BulbState) {
        assert!(!state.on);
        assert_eq!(state.color.as_str(), "#ffffff");
        assert_eq!(state.brightness.percent(), 100);
    }

    #[rstest]
    fn toggle_is_an_involution(mut state: BulbState) {
        let original = state.clone();
        assert!(state.toggle_power());
        assert!(!state.toggle_power());
        assert_eq!(state, original);
    }

    #[rstest]
    fn failed_mutations_leave_state_untouched(mut state: BulbState) {
        state.set_color("#123456").expect("valid color");
        state.set_brightness(40).expect("valid brightness");
        let before = state.clone();

        assert!(state.set_color("#12345").is_err());
        assert!(state.set_brightness(101).is_err());
        assert!(state.set_brightness(-1).is_err());
        assert!(state.apply_preset("rosso").is_err());

        assert_eq!(state, before);
    }

    #[rstest]
    fn presets_are_idempotent(mut state: BulbState) {
        state.apply_preset("cyan").expect("known preset");
        let once = state.clone();
        state.apply_preset("CYAN").expect("known preset");
        assert_eq!(state, once);
        assert_eq!(state.color.as_str(), "#00ffff");
    }

    #[rstest]
    fn serialises_with_plain_fields(mut state: BulbState) {
        state.toggle_power();
        state.set_brightness(75).expect("valid brightness");
        let json = serde_json::to_value(&state).expect("serialise state");
        assert_eq!(
            json,
            serde_json::json!({"on": true, "color": "#ffffff", "brightness": 75})
        );
    }

    #[rstest]
    fn display_lists_every_field(state: BulbState) {
        let text = state.to_string();
        assert_eq!(text, "- Power: off\n- Color: #ffffff\n- Brightness: 100%");
    }
}
