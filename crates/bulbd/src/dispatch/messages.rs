//! Human-readable texts returned by tools and the REST surface.

use bulb_core::{BulbState, Preset, Transition};

/// Full report for `get_state`.
pub fn state_report(state: &BulbState) -> String {
    format!(
        "Bulb state:\n{state}\n\nThe bulb is {} with color {} at {} brightness.",
        state.power_label(),
        state.color,
        state.brightness
    )
}

/// Headline followed by the updated snapshot.
pub fn with_snapshot(headline: &str, state: &BulbState) -> String {
    format!("{headline}\n\nUpdated state:\n{state}")
}

pub fn toggled(transition: &Transition) -> String {
    format!(
        "Bulb switched {} (was {})",
        transition.after.power_label(),
        transition.before.power_label()
    )
}

pub fn color_changed(state: &BulbState) -> String {
    format!("Color changed to {}", state.color)
}

pub fn brightness_changed(state: &BulbState) -> String {
    format!("Brightness set to {}", state.brightness)
}

pub fn preset_applied(preset: Preset) -> String {
    format!("Preset \"{preset}\" applied ({})", preset.hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_describes_every_field() {
        let report = state_report(&BulbState::default());
        assert_eq!(
            report,
            "Bulb state:\n- Power: off\n- Color: #ffffff\n- Brightness: 100%\n\n\
             The bulb is off with color #ffffff at 100% brightness."
        );
    }

    #[test]
    fn preset_headline_names_preset_and_color() {
        assert_eq!(
            preset_applied(Preset::Red),
            "Preset \"red\" applied (#ff0000)"
        );
    }
}
