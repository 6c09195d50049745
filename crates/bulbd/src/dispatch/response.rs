//! Reply envelope encoding.
//!
//! Replies are JSON-RPC 2.0 objects carrying either `result` or `error`.
//! [`ResponseWriter`] frames them as JSON lines for socket transports.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DispatchError;
use super::request::RequestId;

/// Protocol marker carried by every reply.
pub const JSONRPC_VERSION: &str = "2.0";

/// Error member of a failed reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Stable numeric code.
    pub code: i64,
    /// Human-readable explanation.
    pub message: String,
    /// Structured detail for self-correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&DispatchError> for ErrorObject {
    fn from(error: &DispatchError) -> Self {
        Self {
            code: error.code(),
            message: error.public_message(),
            data: error.data(),
        }
    }
}

/// Success or failure member of a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyPayload {
    /// Successful call.
    Result(Value),
    /// Failed call.
    Error(ErrorObject),
}

/// Reply sent back for every request that carried an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Id copied from the request.
    pub id: RequestId,
    /// Outcome.
    #[serde(flatten)]
    pub payload: ReplyPayload,
}

impl ReplyEnvelope {
    /// Builds a success reply.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            payload: ReplyPayload::Result(result),
        }
    }

    /// Builds an error reply.
    pub fn failure(id: RequestId, error: &DispatchError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            payload: ReplyPayload::Error(error.into()),
        }
    }

    /// Decodes a reply body.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body is not a reply envelope.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body.trim_ascii())
    }

    /// Encodes the reply as compact JSON without a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the payload cannot be serialised.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Result value, if the call succeeded.
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ReplyPayload::Result(value) => Some(value),
            ReplyPayload::Error(_) => None,
        }
    }

    /// Error object, if the call failed.
    pub fn error(&self) -> Option<&ErrorObject> {
        match &self.payload {
            ReplyPayload::Result(_) => None,
            ReplyPayload::Error(error) => Some(error),
        }
    }
}

/// Writes replies as JSON lines.
pub struct ResponseWriter<W: Write> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one reply followed by a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns an IO error if serialisation or the write fails.
    pub fn write_reply(&mut self, reply: &ReplyEnvelope) -> io::Result<()> {
        let mut line = reply.encode().map_err(io::Error::other)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()
    }
}
