//! CLI argument definitions for the bulb client.

use clap::{Parser, Subcommand};

/// Command-line client for the simulated bulb daemon.
#[derive(Parser, Debug)]
#[command(name = "bulb", disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations exposed by the CLI.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Relays JSON-RPC lines between stdio and the daemon socket.
    Bridge,
    /// Prints the bulb state.
    State,
    /// Switches the bulb on or off.
    Toggle,
    /// Sets the color from a `#rrggbb` value.
    Color {
        /// Hex color such as `#ff8800`.
        #[arg(value_name = "HEX")]
        hex: String,
    },
    /// Sets the brightness percentage.
    Brightness {
        /// Percentage between 0 and 100.
        #[arg(value_name = "N", allow_negative_numbers = true)]
        percent: i64,
    },
    /// Applies a named color preset.
    Preset {
        /// Preset name such as `red` or `orange`.
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Lists the tools the daemon serves.
    Tools,
}
