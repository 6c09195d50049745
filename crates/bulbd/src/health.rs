//! Lifecycle events of the daemon, as seen by operators.

use std::sync::Arc;

use bulb_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Receives every lifecycle transition of a daemon run, in order.
pub trait HealthReporter: Send + Sync {
    /// Configuration is about to be loaded.
    fn bootstrap_starting(&self);

    /// Configuration, telemetry and socket directories are ready.
    fn bootstrap_succeeded(&self, config: &Config);

    fn bootstrap_failed(&self, error: &BootstrapError);

    /// The `label` socket is accepting connections on `endpoint`.
    fn listener_ready(&self, label: &'static str, endpoint: &SocketEndpoint);

    fn listener_failed(&self, label: &'static str, error: &ListenerError);

    /// Every listener has been joined.
    fn shutdown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, label: &'static str, endpoint: &SocketEndpoint) {
        (**self).listener_ready(label, endpoint);
    }

    fn listener_failed(&self, label: &'static str, error: &ListenerError) {
        (**self).listener_failed(label, error);
    }

    fn shutdown_completed(&self) {
        (**self).shutdown_completed();
    }
}

/// Emits each event as a `tracing` record carrying an `event` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "loading configuration"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            rpc_socket = %config.rpc_socket(),
            http_socket = %config.http_socket(),
            feed_socket = %config.feed_socket(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "configuration loaded"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "cannot start bulbd"
        );
    }

    fn listener_ready(&self, label: &'static str, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            listener = label,
            endpoint = %endpoint,
            "accepting connections"
        );
    }

    fn listener_failed(&self, label: &'static str, error: &ListenerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "listener_failed",
            listener = label,
            error = %error,
            "socket unavailable"
        );
    }

    fn shutdown_completed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            "all listeners stopped"
        );
    }
}
