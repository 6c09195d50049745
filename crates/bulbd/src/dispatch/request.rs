//! Call envelope decoding.
//!
//! A request line is parsed once into a JSON value and then into a typed
//! [`CallEnvelope`]. The `id` member distinguishes three cases: absent (a
//! notification that receives no reply), null or the empty string (a call
//! whose reply carries `"id": null`), and a number or string echoed back
//! verbatim.

use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::DispatchError;

/// Correlation token echoed back in the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id; re-emitted unquoted.
    Number(Number),
    /// String id; re-emitted quoted and escaped.
    String(String),
    /// Null or empty id.
    Null,
}

impl RequestId {
    fn from_value(value: Value) -> Result<Self, DispatchError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::String(text) if text.is_empty() => Ok(Self::Null),
            Value::String(text) => Ok(Self::String(text)),
            Value::Number(number) => Ok(Self::Number(number)),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(
                DispatchError::invalid_request("id must be a number, a string or null"),
            ),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(text) => write!(formatter, "{text:?}"),
            Self::Null => formatter.write_str("null"),
        }
    }
}

/// Decoded request.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEnvelope {
    /// `None` when the request is a notification.
    pub id: Option<RequestId>,
    /// Method name, matched exactly.
    pub method: String,
    /// Raw parameters, if any.
    pub params: Option<Value>,
}

/// A request that could not be decoded, with whatever id was recovered.
#[derive(Debug)]
pub struct RejectedEnvelope {
    /// Id to answer with; null unless a valid id was read.
    pub id: RequestId,
    /// Reason for rejection.
    pub error: DispatchError,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    #[serde(default)]
    method: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
}

// Keeps `"id": null` distinct from a missing `id`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CallEnvelope {
    /// Parses a request body.
    ///
    /// Surrounding whitespace, including the JSON-lines newline, is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`RejectedEnvelope`] carrying a parse error for empty or
    /// non-JSON input, and an invalid-request error for JSON that is not an
    /// object with a string `method`.
    pub fn parse(body: &[u8]) -> Result<Self, RejectedEnvelope> {
        let trimmed = body.trim_ascii();
        if trimmed.is_empty() {
            return Err(RejectedEnvelope::anonymous(DispatchError::parse(
                "empty request",
            )));
        }

        let value: Value = serde_json::from_slice(trimmed)
            .map_err(|error| RejectedEnvelope::anonymous(DispatchError::from_json_error(error)))?;
        if !value.is_object() {
            return Err(RejectedEnvelope::anonymous(DispatchError::invalid_request(
                "request must be a JSON object",
            )));
        }
        let raw = RawEnvelope::deserialize(value)
            .map_err(|error| RejectedEnvelope::anonymous(DispatchError::from_json_error(error)))?;

        let id = raw
            .id
            .map(RequestId::from_value)
            .transpose()
            .map_err(RejectedEnvelope::anonymous)?;

        let Some(Value::String(method)) = raw.method else {
            return Err(RejectedEnvelope {
                id: id.unwrap_or(RequestId::Null),
                error: DispatchError::invalid_request("method must be a string"),
            });
        };

        Ok(Self {
            id,
            method,
            params: raw.params,
        })
    }

    /// Whether the sender expects no reply.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Id to answer with.
    pub fn reply_id(&self) -> RequestId {
        self.id.clone().unwrap_or(RequestId::Null)
    }

    /// Extracts `params.name` and `params.arguments` for `tools/call`.
    ///
    /// # Errors
    ///
    /// Returns a missing-argument error when `name` is absent and an
    /// invalid-argument error when `arguments` is not an object.
    pub fn tool_call(&self) -> Result<ToolCall, DispatchError> {
        const TARGET: &str = "tools/call";
        const EXPECTED: &[&str] = &["name", "arguments"];

        let params = match &self.params {
            Some(Value::Object(params)) => params,
            Some(Value::Null) | None => {
                return Err(DispatchError::missing_argument(TARGET, "name", EXPECTED));
            }
            Some(_) => {
                return Err(DispatchError::invalid_argument(TARGET, "params", "an object"));
            }
        };

        let name = match params.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Null) | None => {
                return Err(DispatchError::missing_argument(TARGET, "name", EXPECTED));
            }
            Some(_) => {
                return Err(DispatchError::invalid_argument(TARGET, "name", "a string"));
            }
        };

        let arguments = match params.get("arguments") {
            Some(Value::Object(arguments)) => arguments.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(DispatchError::invalid_argument(
                    TARGET,
                    "arguments",
                    "an object",
                ));
            }
        };

        Ok(ToolCall { name, arguments })
    }
}

impl RejectedEnvelope {
    fn anonymous(error: DispatchError) -> Self {
        Self {
            id: RequestId::Null,
            error,
        }
    }
}

/// Tool selection and arguments of a `tools/call` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Tool name as sent.
    pub name: String,
    /// Arguments object; empty when absent.
    pub arguments: Map<String, Value>,
}
