use std::process::ExitCode;

/// Exit status when the replay input does not exist.
const EXIT_INPUT_NOT_FOUND: u8 = 2;

fn main() -> ExitCode {
    match gateway_replay::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_input_not_found() => {
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_INPUT_NOT_FOUND)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
