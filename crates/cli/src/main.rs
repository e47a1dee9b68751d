use std::process::ExitCode;

fn main() -> ExitCode {
    deadline_cli::run()
}
