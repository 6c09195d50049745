//! Command-line client for the bulb daemon.
//!
//! The runtime owns argument parsing, configuration loading and the
//! JSON-RPC exchange with the daemon's RPC socket. `bulb bridge` relays
//! stdio traffic verbatim; every other subcommand sends one request and
//! prints the text of the reply. Configuration loading and IO streams can
//! be substituted so the runtime is exercised from tests without a real
//! daemon.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use bulb_config::Config;
use clap::Parser;

mod bridge;
mod cli;
mod command;
mod config;
mod errors;
mod transport;

use cli::{Cli, CliCommand};
use command::{RpcRequest, read_reply};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use transport::connect;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `bulb_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--rpc-socket",
    "--http-socket",
    "--feed-socket",
    "--log-filter",
    "--log-format",
];

/// How long a one-shot command waits for its reply.
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write + Send,
    E: Write,
{
    run_with_loader(args, stdin, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    stdin: R,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write + Send,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let parsed = match Cli::try_parse_from(cli_arguments) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            // --help and --version are successful outputs, unless they
            // cannot be written.
            return match write!(stdout, "{}", error.render()).and_then(|()| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(&config, &parsed.command, stdin, stdout));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

fn execute<R, W>(
    config: &Config,
    command: &CliCommand,
    stdin: R,
    stdout: &mut W,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write + Send,
{
    let mut connection = connect(config.rpc_socket())?;
    let Some((request, shape)) = RpcRequest::for_command(command) else {
        return bridge::relay(connection, stdin, stdout);
    };

    connection
        .set_read_timeout(Some(REPLY_TIMEOUT))
        .map_err(AppError::ReadReply)?;
    request.write_jsonl(&mut connection)?;
    let reply = read_reply(&mut connection)?;
    let text = shape.render(&reply)?;
    writeln!(stdout, "{text}")
        .and_then(|()| stdout.flush())
        .map_err(AppError::WriteOutput)
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    // clap renders its own `error:` prefix and usage hint.
    match error {
        AppError::CliUsage(usage) => write!(stderr, "{}", usage.render()),
        other => writeln!(stderr, "error: {other}"),
    }
    // With stderr broken the exit status is the only signal left, and it
    // already reports failure.
    .ok();
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests;
