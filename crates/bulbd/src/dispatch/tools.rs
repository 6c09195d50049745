//! Tool catalogue and execution for `tools/list` and `tools/call`.

use bulb_core::{Brightness, BulbService, Preset};
use serde_json::{Map, Value, json};

use super::errors::DispatchError;
use super::messages;
use super::request::ToolCall;

/// Tools served by `tools/call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    /// Reports the current state.
    GetState,
    /// Flips the power flag.
    Toggle,
    /// Sets the color.
    SetColor,
    /// Sets the brightness.
    SetBrightness,
    /// Applies a named preset.
    ApplyPreset,
}

impl ToolName {
    /// Every tool in catalogue order.
    pub const ALL: [Self; 5] = [
        Self::GetState,
        Self::Toggle,
        Self::SetColor,
        Self::SetBrightness,
        Self::ApplyPreset,
    ];

    /// Resolves a tool name; matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetState => "get_state",
            Self::Toggle => "toggle",
            Self::SetColor => "set_color",
            Self::SetBrightness => "set_brightness",
            Self::ApplyPreset => "apply_preset",
        }
    }

    /// Names of every tool.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.into_iter().map(Self::as_str).collect()
    }

    /// Arguments the tool requires.
    pub const fn required_arguments(self) -> &'static [&'static str] {
        match self {
            Self::GetState | Self::Toggle => &[],
            Self::SetColor => &["color"],
            Self::SetBrightness => &["brightness"],
            Self::ApplyPreset => &["preset"],
        }
    }

    fn descriptor(self) -> Value {
        let (description, input_schema) = match self {
            Self::GetState => (
                "Report whether the bulb is on, its color and its brightness.",
                json!({"type": "object", "properties": {}}),
            ),
            Self::Toggle => (
                "Switch the bulb on if it is off, or off if it is on.",
                json!({"type": "object", "properties": {}}),
            ),
            Self::SetColor => (
                "Change the bulb color.",
                json!({
                    "type": "object",
                    "properties": {
                        "color": {
                            "type": "string",
                            "description": "Hex color in the form #rrggbb, e.g. #ff0000.",
                            "pattern": "^#[0-9a-fA-F]{6}$",
                        }
                    },
                    "required": ["color"],
                }),
            ),
            Self::SetBrightness => (
                "Change the bulb brightness.",
                json!({
                    "type": "object",
                    "properties": {
                        "brightness": {
                            "type": "number",
                            "description": "Brightness percentage.",
                            "minimum": Brightness::MIN,
                            "maximum": Brightness::MAX,
                        }
                    },
                    "required": ["brightness"],
                }),
            ),
            Self::ApplyPreset => (
                "Set the bulb color from a named preset.",
                json!({
                    "type": "object",
                    "properties": {
                        "preset": {
                            "type": "string",
                            "description": "Preset name.",
                            "enum": Preset::names(),
                        }
                    },
                    "required": ["preset"],
                }),
            ),
        };
        json!({
            "name": self.as_str(),
            "description": description,
            "inputSchema": input_schema,
        })
    }
}

/// Result of `tools/list`.
pub fn catalogue() -> Value {
    let tools: Vec<Value> = ToolName::ALL.into_iter().map(ToolName::descriptor).collect();
    json!({ "tools": tools })
}

/// Runs a tool and returns the `tools/call` result.
///
/// # Errors
///
/// Returns invalid-params errors for unknown tools and bad arguments, and
/// propagates bulb errors unchanged.
pub fn execute(service: &BulbService, call: &ToolCall) -> Result<Value, DispatchError> {
    let tool =
        ToolName::parse(&call.name).ok_or_else(|| DispatchError::unknown_tool(&call.name))?;
    let arguments = Arguments::new(tool, &call.arguments);

    let text = match tool {
        ToolName::GetState => messages::state_report(&service.snapshot()?),
        ToolName::Toggle => {
            let transition = service.toggle()?;
            messages::with_snapshot(&messages::toggled(&transition), &transition.after)
        }
        ToolName::SetColor => {
            let color = arguments.text("color")?;
            let state = service.set_color(&color)?;
            messages::with_snapshot(&messages::color_changed(&state), &state)
        }
        ToolName::SetBrightness => {
            let brightness = arguments.integer("brightness")?;
            let state = service.set_brightness(brightness)?;
            messages::with_snapshot(&messages::brightness_changed(&state), &state)
        }
        ToolName::ApplyPreset => {
            let name = arguments.text("preset")?;
            let (preset, state) = service.apply_preset(&name)?;
            messages::with_snapshot(&messages::preset_applied(preset), &state)
        }
    };
    Ok(text_content(text))
}

/// Wraps text in the `content` array of a tool result.
pub fn text_content(text: String) -> Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

/// Argument lookup tolerant of quoted and bare scalars.
pub(crate) struct Arguments<'a> {
    tool: ToolName,
    values: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(tool: ToolName, values: &'a Map<String, Value>) -> Self {
        Self { tool, values }
    }

    fn value(&self, name: &'static str) -> Result<&Value, DispatchError> {
        match self.values.get(name) {
            Some(Value::Null) | None => Err(DispatchError::missing_argument(
                self.tool.as_str(),
                name,
                self.tool.required_arguments(),
            )),
            Some(value) => Ok(value),
        }
    }

    pub(crate) fn text(&self, name: &'static str) -> Result<String, DispatchError> {
        match self.value(name)? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(
                DispatchError::invalid_argument(self.tool.as_str(), name, "a string"),
            ),
        }
    }

    // Fractional values truncate toward zero; out-of-range magnitudes
    // saturate so that range checks still reject them.
    pub(crate) fn integer(&self, name: &'static str) -> Result<i64, DispatchError> {
        let invalid = || DispatchError::invalid_argument(self.tool.as_str(), name, "a number");
        match self.value(name)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(truncate))
                .ok_or_else(invalid),
            Value::String(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        text.parse::<f64>()
                            .ok()
                            .filter(|value| value.is_finite())
                            .map(truncate)
                    })
                    .ok_or_else(invalid)
            }
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(invalid()),
        }
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
