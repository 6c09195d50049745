//! JSON-RPC request dispatch shared by every transport.
//!
//! A request body is one JSON object:
//!
//! ```json
//! {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"toggle"}}
//! ```
//!
//! The dispatcher answers with a reply envelope carrying the same id and
//! either a `result` or an `error`:
//!
//! ```json
//! {"jsonrpc":"2.0","id":1,"result":{"content":[{"type":"text","text":"..."}]}}
//! ```
//!
//! Requests without an `id` are notifications: they run, but nothing is sent
//! back. Transports decide how to frame bodies; the raw socket uses JSON
//! lines via [`RpcConnectionHandler`].

mod dispatcher;
mod errors;
mod handler;
pub(crate) mod messages;
mod request;
mod response;
mod router;
pub(crate) mod tools;

pub use self::dispatcher::{DispatchOutcome, RequestDispatcher};
pub use self::errors::{
    DispatchError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
pub(crate) use self::handler::RpcConnectionHandler;
pub use self::request::{CallEnvelope, RejectedEnvelope, RequestId, ToolCall};
pub use self::response::{ErrorObject, JSONRPC_VERSION, ReplyEnvelope, ReplyPayload, ResponseWriter};
pub use self::router::{Method, PROTOCOL_VERSION, SERVER_NAME, server_descriptor};
pub use self::tools::ToolName;
