use std::process::ExitCode;

fn main() -> ExitCode {
    vantage_cli::run()
}
