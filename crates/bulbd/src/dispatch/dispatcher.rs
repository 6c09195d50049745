//! Transport-independent request dispatcher.

use std::sync::Arc;

use bulb_core::BulbService;
use tracing::{debug, error, warn};

use super::errors::DispatchError;
use super::request::{CallEnvelope, RequestId};
use super::response::ReplyEnvelope;
use super::router::{DISPATCH_TARGET, MethodRouter};

// Sent if a reply cannot be serialised, which only a bug can cause.
const FALLBACK_REPLY: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"internal error"}}"#;

/// What a transport should send back.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A reply envelope.
    Reply(ReplyEnvelope),
    /// Nothing; the request was a notification.
    NoReply,
}

impl DispatchOutcome {
    /// The reply, if any.
    pub fn reply(&self) -> Option<&ReplyEnvelope> {
        match self {
            Self::Reply(reply) => Some(reply),
            Self::NoReply => None,
        }
    }

    /// Encoded reply bytes without a trailing newline, or `None` for
    /// notifications.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Reply(reply) => Some(reply.encode().unwrap_or_else(|error| {
                error!(target: DISPATCH_TARGET, %error, "failed to encode reply");
                FALLBACK_REPLY.to_vec()
            })),
            Self::NoReply => None,
        }
    }
}

/// Decodes, routes and answers call envelopes.
///
/// The dispatcher holds no per-call state. Every failure is turned into an
/// error reply here; nothing propagates to the transport.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    router: MethodRouter,
}

impl RequestDispatcher {
    /// Creates a dispatcher over the shared bulb service.
    pub fn new(service: Arc<BulbService>) -> Self {
        Self {
            router: MethodRouter::new(service),
        }
    }

    /// The shared bulb service.
    pub fn service(&self) -> &Arc<BulbService> {
        self.router.service()
    }

    /// Handles a raw request body.
    pub fn dispatch(&self, body: &[u8]) -> DispatchOutcome {
        match CallEnvelope::parse(body) {
            Ok(envelope) => self.dispatch_envelope(&envelope),
            Err(rejected) => {
                warn!(
                    target: DISPATCH_TARGET,
                    error = %rejected.error,
                    "rejected request"
                );
                DispatchOutcome::Reply(ReplyEnvelope::failure(rejected.id, &rejected.error))
            }
        }
    }

    /// Handles a decoded envelope.
    pub fn dispatch_envelope(&self, envelope: &CallEnvelope) -> DispatchOutcome {
        debug!(
            target: DISPATCH_TARGET,
            method = %envelope.method,
            id = ?envelope.id,
            "dispatching request"
        );
        let result = self.router.route(envelope);
        if let Err(failure) = &result {
            log_failure(&envelope.method, envelope.id.as_ref(), failure);
        }
        match (envelope.id.clone(), result) {
            (None, _) => DispatchOutcome::NoReply,
            (Some(id), Ok(value)) => DispatchOutcome::Reply(ReplyEnvelope::success(id, value)),
            (Some(id), Err(failure)) => {
                DispatchOutcome::Reply(ReplyEnvelope::failure(id, &failure))
            }
        }
    }

    /// In-process binding: request bytes in, reply bytes out.
    ///
    /// Returns `None` when the request was a notification.
    pub fn handle_bytes(&self, body: &[u8]) -> Option<Vec<u8>> {
        self.dispatch(body).into_bytes()
    }
}

fn log_failure(method: &str, id: Option<&RequestId>, failure: &DispatchError) {
    if failure.is_internal() {
        error!(
            target: DISPATCH_TARGET,
            method,
            id = ?id,
            error = %failure,
            "request failed"
        );
    } else {
        debug!(
            target: DISPATCH_TARGET,
            method,
            id = ?id,
            code = failure.code(),
            error = %failure,
            "request rejected"
        );
    }
}
