//! Configuration loading helpers for the bulb CLI.
//!
//! Leading arguments that name configuration flags are routed to
//! `ortho_config`; everything from the first other token onwards is the
//! command.

use std::ffi::{OsStr, OsString};

use bulb_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    ///
    /// Configuration flags (listed in `CONFIG_CLI_FLAGS`) must precede the
    /// subcommand; later occurrences are parsed as command arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }
        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (&*argument_text, false),
        };

        if super::CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }
        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_value = false;

    for argument in args.iter().skip(1) {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }
        match OrthoConfigLoader::process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", false)]
    #[case("--rpc-socket", true)]
    #[case("--config-path", true)]
    fn known_flags_are_included(#[case] flag: &str, #[case] expected: bool) {
        let FlagAction::Include { needs_value } =
            OrthoConfigLoader::process_config_flag(OsStr::new(flag))
        else {
            panic!("expected {flag} to be included");
        };
        assert_eq!(needs_value, expected);
    }

    #[rstest]
    #[case("toggle")]
    #[case("--unknown")]
    #[case("-5")]
    fn other_tokens_stop_the_scan(#[case] token: &str) {
        assert!(matches!(
            OrthoConfigLoader::process_config_flag(OsStr::new(token)),
            FlagAction::Skip
        ));
    }

    #[test]
    fn leading_flags_are_split_from_the_command() {
        let args = os_args(&[
            "bulb",
            "--rpc-socket",
            "tcp://127.0.0.1:9000",
            "--log-format=compact",
            "color",
            "#ff0000",
        ]);
        let split = split_config_arguments(&args);
        assert_eq!(
            split.config_arguments,
            os_args(&[
                "bulb",
                "--rpc-socket",
                "tcp://127.0.0.1:9000",
                "--log-format=compact"
            ])
        );
        assert_eq!(split.command_start, 4);
    }

    #[test]
    fn flags_after_the_command_stay_with_it() {
        let args = os_args(&["bulb", "state", "--rpc-socket", "tcp://127.0.0.1:1"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, os_args(&["bulb"]));
        assert_eq!(split.command_start, 1);
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert_eq!(split.command_start, 0);
    }
}
