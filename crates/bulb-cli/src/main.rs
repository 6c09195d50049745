//! CLI entrypoint for the bulb daemon client.
//!
//! The binary delegates to [`bulb_cli::run`], which loads configuration,
//! parses the command, and talks JSON-RPC to the daemon's RPC socket.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    bulb_cli::run(
        std::env::args_os(),
        io::stdin().lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
}
