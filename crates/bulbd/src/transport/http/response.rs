//! Responses produced by the routes.

use std::io::Cursor;

use serde_json::Value;
use tiny_http::{Header, Response};

pub(crate) type StatusCode = u16;

/// Status plus an optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpResponse {
    status: StatusCode,
    body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub(crate) fn json(status: StatusCode, value: &Value) -> Self {
        Self::json_bytes(status, value.to_string().into_bytes())
    }

    /// Pre-encoded JSON body.
    pub(crate) fn json_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub(crate) const fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub(crate) const fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Converts into the response `tiny_http` writes.
    pub(crate) fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let status = tiny_http::StatusCode(self.status);
        let Some(body) = self.body else {
            return Response::from_data(Vec::new()).with_status_code(status);
        };
        let response = Response::from_data(body).with_status_code(status);
        match Header::from_bytes("Content-Type", "application/json") {
            Ok(header) => response.with_header(header),
            Err(()) => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn content_type(response: &Response<Cursor<Vec<u8>>>) -> Option<String> {
        response
            .headers()
            .iter()
            .find(|header| header.field.equiv("Content-Type"))
            .map(|header| header.value.to_string())
    }

    #[test]
    fn json_responses_are_typed() {
        let response = HttpResponse::json(200, &json!({"status": "ok"})).into_response();
        assert_eq!(response.status_code().0, 200);
        assert_eq!(content_type(&response).as_deref(), Some("application/json"));
        assert_eq!(response.data_length(), Some(15));
    }

    #[test]
    fn no_content_has_no_body() {
        let response = HttpResponse::no_content();
        assert!(response.body().is_empty());
        let response = response.into_response();
        assert_eq!(response.status_code().0, 204);
        assert_eq!(response.data_length(), Some(0));
        assert_eq!(content_type(&response), None);
    }
}
