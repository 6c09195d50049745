//! The bulb daemon.
//!
//! `bulbd` keeps one simulated light bulb in memory and exposes it through
//! JSON-RPC 2.0 methods (`initialize`, `ping`, `tools/list`, `tools/call`)
//! over three sockets configured via [`bulb_config`]:
//!
//! - the RPC socket speaks JSON lines, one request per line;
//! - the HTTP socket serves `POST /mcp`, a REST surface under `/api/bulb`,
//!   and `/health`;
//! - the feed socket pushes a `{"type":"state",...}` line on every change.
//!
//! All transports share one [`RequestDispatcher`], which decodes envelopes,
//! routes methods, and turns every failure into an error reply. Requests
//! without an `id` are notifications and receive no reply.
//!
//! The daemon runs in the foreground. [`run_daemon`] bootstraps
//! configuration and telemetry, starts the listeners, and blocks until a
//! termination signal arrives. Health reporting hooks emit structured
//! events at each stage.

mod bootstrap;
mod dispatch;
mod health;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{
    CallEnvelope, DispatchError, DispatchOutcome, ErrorObject, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, Method, PARSE_ERROR, PROTOCOL_VERSION,
    RejectedEnvelope, ReplyEnvelope, ReplyPayload, RequestDispatcher, RequestId, ResponseWriter,
    SERVER_NAME, ToolCall, ToolName, server_descriptor,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
