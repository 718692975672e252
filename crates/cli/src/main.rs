use std::process::ExitCode;

fn main() -> ExitCode {
    parcel_cli::run()
}
