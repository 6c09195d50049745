//! Request modelling and reply rendering for one-shot commands.
//!
//! Each subcommand becomes a single JSON-RPC request. The reply is printed
//! as plain text: tool results as their text content, the catalogue as one
//! tool name per line.

use std::io::{BufRead, BufReader, Read, Write};

use bulbd::{JSONRPC_VERSION, ReplyEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppError;
use crate::cli::CliCommand;

/// Id used for one-shot requests; each runs on its own connection.
const REQUEST_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyShape {
    ToolText,
    ToolNames,
}

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl RpcRequest {
    fn new(method: &'static str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method,
            params,
        }
    }

    fn tool(name: &str, arguments: Value) -> Self {
        Self::new(
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        )
    }

    /// Request and expected reply shape for a one-shot command; `None` for
    /// the bridge.
    pub(crate) fn for_command(command: &CliCommand) -> Option<(Self, ReplyShape)> {
        let request = match command {
            CliCommand::Bridge => return None,
            CliCommand::Tools => return Some((Self::new("tools/list", None), ReplyShape::ToolNames)),
            CliCommand::State => Self::tool("get_state", json!({})),
            CliCommand::Toggle => Self::tool("toggle", json!({})),
            CliCommand::Color { hex } => Self::tool("set_color", json!({ "color": hex })),
            CliCommand::Brightness { percent } => {
                Self::tool("set_brightness", json!({ "brightness": percent }))
            }
            CliCommand::Preset { name } => Self::tool("apply_preset", json!({ "preset": name })),
        };
        Some((request, ReplyShape::ToolText))
    }

    pub(crate) fn write_jsonl<W>(&self, writer: &mut W) -> Result<(), AppError>
    where
        W: Write,
    {
        serde_json::to_writer(&mut *writer, self).map_err(AppError::SerialiseRequest)?;
        writer.write_all(b"\n").map_err(AppError::SendRequest)?;
        writer.flush().map_err(AppError::SendRequest)
    }
}

/// Reads the single reply line answering a one-shot request.
pub(crate) fn read_reply<R: Read>(connection: R) -> Result<ReplyEnvelope, AppError> {
    let mut reader = BufReader::new(connection);
    let mut line = String::new();
    if reader.read_line(&mut line).map_err(AppError::ReadReply)? == 0 {
        return Err(AppError::MissingReply);
    }
    ReplyEnvelope::decode(line.as_bytes()).map_err(AppError::ParseReply)
}

impl ReplyShape {
    /// Text printed for a reply; error replies become [`AppError::Remote`].
    pub(crate) fn render(self, reply: &ReplyEnvelope) -> Result<String, AppError> {
        if let Some(error) = reply.error() {
            return Err(AppError::Remote {
                code: error.code,
                message: error.message.clone(),
            });
        }
        let result = reply.result().ok_or(AppError::UnexpectedReply("a result"))?;
        let (field, key) = match self {
            Self::ToolText => ("content", "text"),
            Self::ToolNames => ("tools", "name"),
        };
        let lines: Vec<&str> = result
            .get(field)
            .and_then(Value::as_array)
            .ok_or(AppError::UnexpectedReply(field))?
            .iter()
            .filter_map(|item| item.get(key).and_then(Value::as_str))
            .collect();
        Ok(lines.join("\n"))
    }
}
