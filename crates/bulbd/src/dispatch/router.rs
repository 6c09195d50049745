//! Method routing for decoded call envelopes.

use std::sync::Arc;

use bulb_core::BulbService;
use serde_json::{Value, json};

use super::errors::DispatchError;
use super::request::CallEnvelope;
use super::tools;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name announced by `initialize`.
pub const SERVER_NAME: &str = "bulbd";

const NOTIFICATION_PREFIX: &str = "notifications/";

/// Methods served by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Handshake returning the server descriptor.
    Initialize,
    /// Liveness check.
    Ping,
    /// Tool catalogue.
    ToolsList,
    /// Tool invocation.
    ToolsCall,
    /// Client lifecycle notification such as `notifications/initialized`.
    Notification,
}

impl Method {
    /// Resolves a method name; matching is exact.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Self::Initialize),
            "ping" => Some(Self::Ping),
            "tools/list" => Some(Self::ToolsList),
            "tools/call" => Some(Self::ToolsCall),
            other if other.starts_with(NOTIFICATION_PREFIX) => Some(Self::Notification),
            _ => None,
        }
    }
}

/// Result of `initialize`.
pub fn server_descriptor() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Routes envelopes to method handlers.
#[derive(Debug, Clone)]
pub struct MethodRouter {
    service: Arc<BulbService>,
}

impl MethodRouter {
    /// Creates a router over the shared bulb service.
    pub fn new(service: Arc<BulbService>) -> Self {
        Self { service }
    }

    /// The shared bulb service.
    pub fn service(&self) -> &Arc<BulbService> {
        &self.service
    }

    /// Executes the envelope's method and returns its result value.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MethodNotFound`] for unserved methods, and
    /// whatever the tool layer reports for `tools/call`.
    pub fn route(&self, envelope: &CallEnvelope) -> Result<Value, DispatchError> {
        let method = Method::resolve(&envelope.method)
            .ok_or_else(|| DispatchError::method_not_found(&envelope.method))?;
        match method {
            Method::Initialize => Ok(server_descriptor()),
            Method::Ping => Ok(json!({})),
            Method::ToolsList => Ok(tools::catalogue()),
            Method::ToolsCall => tools::execute(&self.service, &envelope.tool_call()?),
            // Lifecycle notifications carry no work; with an id they are
            // not notifications at all.
            Method::Notification if envelope.is_notification() => Ok(Value::Null),
            Method::Notification => Err(DispatchError::method_not_found(&envelope.method)),
        }
    }
}
