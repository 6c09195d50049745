//! Harness shared by the CLI behaviour suites.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;

use bulb_config::{Config, SocketEndpoint};
use bulbd::RequestDispatcher;
use serde_json::Value;

use crate::{AppError, ConfigLoader};

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Serves one connection with a real dispatcher over a fresh bulb.
pub(super) struct FakeDaemon {
    port: u16,
    requests: Arc<Mutex<Vec<Value>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeDaemon {
    pub(super) fn spawn() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind fake daemon");
        let port = listener.local_addr().expect("local addr").port();
        let requests: Arc<Mutex<Vec<Value>>> = Arc::default();
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            let dispatcher = RequestDispatcher::new(Arc::default());
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut writer = stream.try_clone().expect("clone stream");
            for line in BufReader::new(stream).lines() {
                let Ok(line) = line else {
                    break;
                };
                if let Ok(request) = serde_json::from_str(&line) {
                    recorded.lock().expect("lock requests").push(request);
                }
                if let Some(mut reply) = dispatcher.handle_bytes(line.as_bytes()) {
                    reply.push(b'\n');
                    writer.write_all(&reply).expect("write reply");
                }
            }
        });
        Self {
            port,
            requests,
            handle: Some(handle),
        }
    }

    /// Waits for the served connection to close and returns what it saw.
    pub(super) fn take_requests(&mut self) -> Vec<Value> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("fake daemon thread");
        }
        self.requests.lock().expect("lock requests").clone()
    }
}

/// Port nothing listens on.
pub(super) fn closed_port() -> u16 {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind throwaway listener");
    listener.local_addr().expect("local addr").port()
}

#[derive(Default)]
pub(super) struct TestWorld {
    pub(super) config: Config,
    daemon: Option<FakeDaemon>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<ExitCode>,
    requests: Vec<Value>,
}

impl TestWorld {
    pub(super) fn start_daemon(&mut self) {
        let daemon = FakeDaemon::spawn();
        self.config.rpc_socket = SocketEndpoint::tcp("127.0.0.1", daemon.port);
        self.daemon = Some(daemon);
    }

    pub(super) fn run(&mut self, command: &str, stdin: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let mut args = vec![OsString::from("bulb")];
        args.extend(command.split_whitespace().map(OsString::from));
        let loader = StaticConfigLoader {
            config: self.config.clone(),
        };
        let exit = crate::run_with_loader(
            args,
            stdin.as_bytes(),
            &mut self.stdout,
            &mut self.stderr,
            &loader,
        );
        self.exit_code = Some(exit);
        if let Some(daemon) = self.daemon.as_mut() {
            self.requests = daemon.take_requests();
        }
    }

    pub(super) fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout utf8")
    }

    pub(super) fn stderr_text(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("stderr utf8")
    }

    pub(super) fn exit_code(&self) -> ExitCode {
        self.exit_code.expect("exit code recorded")
    }

    pub(super) fn requests(&self) -> &[Value] {
        &self.requests
    }
}
