use std::process::ExitCode;

fn main() -> ExitCode {
    cobasket_cli::run()
}
