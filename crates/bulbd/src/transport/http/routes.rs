//! Request routing for the HTTP surface.
//!
//! `/mcp` carries JSON-RPC envelopes; `/api/bulb` is a small REST surface
//! over the same service; `/health` answers liveness checks.

use bulb_core::BulbState;
use serde_json::{Map, Value, json};
use tiny_http::Method;

use crate::dispatch::messages;
use crate::dispatch::tools::{Arguments, ToolName};
use crate::dispatch::{
    DispatchError, DispatchOutcome, ReplyEnvelope, RequestDispatcher, RequestId,
    SERVER_NAME, server_descriptor,
};

use super::errors::HttpError;
use super::request::HttpRequest;
use super::response::{HttpResponse, StatusCode};

/// Known paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Mcp,
    Health,
    BulbState,
    Toggle,
    Color,
    Brightness,
    Preset,
}

impl Route {
    pub(crate) fn resolve(path: &str) -> Option<Self> {
        Some(match path {
            "/mcp" => Self::Mcp,
            "/health" => Self::Health,
            "/api/bulb" => Self::BulbState,
            "/api/bulb/toggle" => Self::Toggle,
            "/api/bulb/color" => Self::Color,
            "/api/bulb/brightness" => Self::Brightness,
            "/api/bulb/preset" => Self::Preset,
            _ => return None,
        })
    }
}

/// Produces the response for one request. Never fails; every problem maps
/// to a status.
pub(crate) fn respond(dispatcher: &RequestDispatcher, request: &HttpRequest) -> HttpResponse {
    if request.method == Method::Options {
        return HttpResponse::no_content();
    }
    let Some(route) = Route::resolve(&request.path) else {
        return failure(404, format!("no route for {}", request.path));
    };
    match (route, &request.method) {
        (Route::Mcp, Method::Post) => match dispatcher.dispatch(&request.body) {
            DispatchOutcome::Reply(reply) => reply_response(&reply),
            DispatchOutcome::NoReply => HttpResponse::no_content(),
        },
        (Route::Mcp, Method::Get) => {
            reply_response(&ReplyEnvelope::success(RequestId::Null, server_descriptor()))
        }
        (Route::Health, Method::Get) => {
            HttpResponse::json(200, &json!({ "status": "ok", "service": SERVER_NAME }))
        }
        (Route::BulbState, Method::Get) => match dispatcher.service().snapshot() {
            Ok(state) => HttpResponse::json(200, &json!({ "success": true, "data": state })),
            Err(error) => rest_failure(&DispatchError::from(error)),
        },
        (Route::Toggle, Method::Post) => rest_action(
            dispatcher
                .service()
                .toggle()
                .map(|transition| (messages::toggled(&transition), transition.after))
                .map_err(DispatchError::from),
        ),
        (Route::Color, Method::Post) => rest_action(rest_body(request).and_then(|body| {
            let color = Arguments::new(ToolName::SetColor, &body).text("color")?;
            let state = dispatcher.service().set_color(&color)?;
            Ok((messages::color_changed(&state), state))
        })),
        (Route::Brightness, Method::Post) => {
            rest_action(rest_body(request).and_then(|body| {
                let brightness =
                    Arguments::new(ToolName::SetBrightness, &body).integer("brightness")?;
                let state = dispatcher.service().set_brightness(brightness)?;
                Ok((messages::brightness_changed(&state), state))
            }))
        }
        (Route::Preset, Method::Post) => rest_action(rest_body(request).and_then(|body| {
            let name = Arguments::new(ToolName::ApplyPreset, &body).text("preset")?;
            let (preset, state) = dispatcher.service().apply_preset(&name)?;
            Ok((messages::preset_applied(preset), state))
        })),
        (_, method) => failure(
            405,
            format!("method {method} is not allowed on {}", request.path),
        ),
    }
}

/// Answer for a request whose body was refused.
pub(crate) fn rejection(error: &HttpError) -> HttpResponse {
    failure(error.status(), error.to_string())
}

fn reply_response(reply: &ReplyEnvelope) -> HttpResponse {
    match reply.encode() {
        Ok(body) => HttpResponse::json_bytes(200, body),
        Err(_) => failure(500, "internal error".to_owned()),
    }
}

/// Request body as a JSON object; an empty body is an empty object.
fn rest_body(request: &HttpRequest) -> Result<Map<String, Value>, DispatchError> {
    if request.body.trim_ascii().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice(&request.body) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(_) => Err(DispatchError::invalid_request(
            "request body must be a JSON object",
        )),
        Err(error) => Err(DispatchError::from_json_error(error)),
    }
}

fn rest_action(result: Result<(String, BulbState), DispatchError>) -> HttpResponse {
    match result {
        Ok((message, state)) => HttpResponse::json(
            200,
            &json!({ "success": true, "message": message, "data": state }),
        ),
        Err(error) => rest_failure(&error),
    }
}

fn rest_failure(error: &DispatchError) -> HttpResponse {
    let status = if error.is_internal() { 500 } else { 400 };
    failure(status, error.public_message())
}

fn failure(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::json(status, &json!({ "success": false, "message": message }))
}
