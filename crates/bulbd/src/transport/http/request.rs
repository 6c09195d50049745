//! Requests as the routes see them.

use std::io::Read;

use tiny_http::{Method, Request};

use super::errors::HttpError;

/// Largest accepted request body.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Method, path and fully read body of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpRequest {
    pub(crate) method: Method,
    /// Request path without the query string.
    pub(crate) path: String,
    pub(crate) body: Vec<u8>,
}

impl HttpRequest {
    /// Reads the body of `request`; the request stays answerable.
    pub(crate) fn read(request: &mut Request) -> Result<Self, HttpError> {
        let declared = request.body_length();
        let body = read_body(request.as_reader(), declared)?;
        let url = request.url();
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        Ok(Self {
            method: request.method().clone(),
            path: path.to_owned(),
            body,
        })
    }
}

// Chunked bodies declare no length, so the limit also bounds the read.
fn read_body(reader: &mut dyn Read, declared: Option<usize>) -> Result<Vec<u8>, HttpError> {
    let too_large = || HttpError::BodyTooLarge {
        limit: MAX_BODY_BYTES,
    };
    if declared.is_some_and(|length| length > MAX_BODY_BYTES) {
        return Err(too_large());
    }
    let mut body = Vec::with_capacity(declared.unwrap_or_default());
    reader
        .take(MAX_BODY_BYTES as u64 + 1)
        .read_to_end(&mut body)?;
    if body.len() > MAX_BODY_BYTES {
        return Err(too_large());
    }
    Ok(body)
}
