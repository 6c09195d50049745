use std::process::ExitCode;

fn main() -> ExitCode {
    match bulbd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Telemetry may not be installed yet, so report directly.
            eprintln!("bulbd: {error}");
            ExitCode::FAILURE
        }
    }
}
