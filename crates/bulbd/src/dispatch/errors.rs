//! Error taxonomy for JSON-RPC dispatch.
//!
//! Every variant maps to a stable numeric code and a client-facing message.
//! Business-rule failures share the invalid-params code and are told apart
//! by `data.kind`. Internal failures never expose their detail on the wire.

use bulb_core::{Brightness, BulbError, Preset};
use serde_json::{Value, json};
use thiserror::Error;

use super::tools::ToolName;

/// Body could not be parsed as JSON.
pub const PARSE_ERROR: i64 = -32700;
/// JSON was valid but not a call envelope.
pub const INVALID_REQUEST: i64 = -32600;
/// No such method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Tool name or arguments rejected.
pub const INVALID_PARAMS: i64 = -32602;
/// Unexpected failure inside the daemon.
pub const INTERNAL_ERROR: i64 = -32603;

/// Errors surfaced while decoding, routing or executing a call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request body is not JSON.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The request is JSON but not a usable envelope.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The method is not served.
    #[error("method not found: {method}")]
    MethodNotFound { method: String },

    /// `tools/call` named a tool outside the catalogue.
    #[error("unknown tool '{name}'; available tools: {available}", available = ToolName::names().join(", "))]
    UnknownTool { name: String },

    /// A required argument is absent.
    #[error(
        "missing required argument '{argument}' for {target}; expected arguments: {expected_list}",
        expected_list = .expected.join(", ")
    )]
    MissingArgument {
        target: String,
        argument: &'static str,
        expected: Vec<&'static str>,
    },

    /// An argument is present but has the wrong shape.
    #[error("invalid argument '{argument}' for {target}: expected {expected}")]
    InvalidArgument {
        target: String,
        argument: &'static str,
        expected: &'static str,
    },

    /// The bulb rejected the operation.
    #[error(transparent)]
    Bulb(#[from] BulbError),

    /// Unexpected failure; the message stays in the logs.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DispatchError {
    /// Creates a parse error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Parse {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a parse error with a custom message.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a method not found error.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(
        target: impl Into<String>,
        argument: &'static str,
        expected: &[&'static str],
    ) -> Self {
        Self::MissingArgument {
            target: target.into(),
            argument,
            expected: expected.to_vec(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(
        target: impl Into<String>,
        argument: &'static str,
        expected: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            target: target.into(),
            argument,
            expected,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wire code for this error.
    pub fn code(&self) -> i64 {
        match self {
            Self::Parse { .. } => PARSE_ERROR,
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::UnknownTool { .. }
            | Self::MissingArgument { .. }
            | Self::InvalidArgument { .. } => INVALID_PARAMS,
            Self::Bulb(BulbError::Poisoned) | Self::Internal { .. } => INTERNAL_ERROR,
            Self::Bulb(_) => INVALID_PARAMS,
        }
    }

    /// Whether the error is an unexpected failure rather than a client
    /// mistake.
    pub fn is_internal(&self) -> bool {
        self.code() == INTERNAL_ERROR
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "internal error".to_owned()
        } else {
            self.to_string()
        }
    }

    /// Structured detail sent alongside invalid-params errors.
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::UnknownTool { name } => Some(json!({
                "kind": "unknown_tool",
                "name": name,
                "available": ToolName::names(),
            })),
            Self::MissingArgument {
                argument, expected, ..
            } => Some(json!({
                "kind": "missing_argument",
                "argument": argument,
                "expected": expected,
            })),
            Self::InvalidArgument {
                argument, expected, ..
            } => Some(json!({
                "kind": "invalid_argument",
                "argument": argument,
                "expected": expected,
            })),
            Self::Bulb(BulbError::InvalidColor { value }) => Some(json!({
                "kind": "invalid_color",
                "value": value,
                "expected": "#rrggbb",
            })),
            Self::Bulb(BulbError::OutOfRange { value }) => Some(json!({
                "kind": "out_of_range",
                "value": value,
                "min": Brightness::MIN,
                "max": Brightness::MAX,
            })),
            Self::Bulb(BulbError::UnknownPreset { name }) => Some(json!({
                "kind": "unknown_preset",
                "name": name,
                "available": Preset::names(),
            })),
            Self::Parse { .. }
            | Self::InvalidRequest { .. }
            | Self::MethodNotFound { .. }
            | Self::Bulb(BulbError::Poisoned)
            | Self::Internal { .. } => None,
        }
    }
}
