use std::process::ExitCode;

fn main() -> ExitCode {
    bikerent_cli::run()
}
