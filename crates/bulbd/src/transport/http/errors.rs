//! Request body failures.

use std::io;

use thiserror::Error;

use super::response::StatusCode;

/// Why a request body was refused.
#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("request body could not be read: {0}")]
    Body(#[from] io::Error),
}

impl HttpError {
    pub(crate) const fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge { .. } => 413,
            Self::Body(_) => 400,
        }
    }
}
