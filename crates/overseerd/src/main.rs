use std::process::ExitCode;

fn main() -> ExitCode {
    match overseerd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("overseerd: {error}");
            ExitCode::FAILURE
        }
    }
}
