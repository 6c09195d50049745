//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use bulb_config::SocketEndpoint;
use bulb_core::BulbService;
use tracing::info;

use crate::bootstrap::{ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
use crate::dispatch::RpcConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::{
    ConnectionHandler, FeedConnectionHandler, HttpListener, ListenerError, ListenerHandle,
    SocketListener,
};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// A bound endpoint whose serving thread has not started.
enum Pending {
    Stream(SocketListener, Arc<dyn ConnectionHandler>),
    Http(HttpListener),
}

impl Pending {
    fn label(&self) -> &'static str {
        match self {
            Self::Stream(listener, _) => listener.label(),
            Self::Http(listener) => listener.label(),
        }
    }

    fn start(self) -> Result<ListenerHandle, ListenerError> {
        match self {
            Self::Stream(listener, handler) => listener.start(handler),
            Self::Http(listener) => listener.start(),
        }
    }
}

/// Running listeners over one shared bulb.
pub(crate) struct Runtime {
    listeners: Vec<ListenerHandle>,
    service: Arc<BulbService>,
    reporter: Arc<dyn HealthReporter>,
}

impl Runtime {
    /// Binds every endpoint, then starts serving.
    ///
    /// Binding happens first so a taken port leaves no thread behind.
    pub(crate) fn start(daemon: &Daemon) -> Result<Self, LaunchError> {
        let config = daemon.config();
        let reporter = Arc::clone(daemon.reporter());
        let dispatcher = daemon.dispatcher();
        let observer = reporter.as_ref();
        let report = |label: &'static str| {
            move |error: &ListenerError| observer.listener_failed(label, error)
        };

        let rpc = SocketListener::bind("rpc", config.rpc_socket()).inspect_err(report("rpc"))?;
        let http = HttpListener::bind("http", config.http_socket(), Arc::clone(&dispatcher))
            .inspect_err(report("http"))?;
        let feed = SocketListener::bind("feed", config.feed_socket()).inspect_err(report("feed"))?;
        let bound = [
            Pending::Stream(rpc, Arc::new(RpcConnectionHandler::new(dispatcher))),
            Pending::Http(http),
            Pending::Stream(
                feed,
                Arc::new(FeedConnectionHandler::new(Arc::clone(daemon.service()))),
            ),
        ];

        let mut listeners = Vec::with_capacity(bound.len());
        for pending in bound {
            let label = pending.label();
            let handle = pending.start().inspect_err(report(label))?;
            reporter.listener_ready(handle.label(), handle.endpoint());
            listeners.push(handle);
        }

        Ok(Self {
            listeners,
            service: Arc::clone(daemon.service()),
            reporter,
        })
    }

    /// Endpoint a listener actually bound, with ephemeral ports resolved.
    pub(crate) fn endpoint(&self, label: &str) -> Option<&SocketEndpoint> {
        self.listeners
            .iter()
            .find(|handle| handle.label() == label)
            .map(ListenerHandle::endpoint)
    }

    /// Stops accepting, disconnects feed subscribers and joins the listener
    /// threads.
    ///
    /// Every listener is joined even when an earlier one fails; the first
    /// failure is returned.
    pub(crate) fn stop(self) -> Result<(), LaunchError> {
        for handle in &self.listeners {
            handle.shutdown();
        }
        self.service.close_feed();
        let outcome = self
            .listeners
            .into_iter()
            .map(ListenerHandle::join)
            .fold(Ok(()), Result::and);
        self.reporter.shutdown_completed();
        outcome.map_err(LaunchError::from)
    }
}

/// Runs the daemon using the production collaborators.
///
/// Blocks until SIGTERM, SIGINT, SIGQUIT or SIGHUP arrives.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, reporter)?;
    info!(
        target: PROCESS_TARGET,
        version = env!("CARGO_PKG_VERSION"),
        "starting daemon runtime"
    );
    let runtime = Runtime::start(&daemon)?;
    shutdown.wait()?;
    runtime.stop()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
