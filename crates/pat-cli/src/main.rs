use std::process::ExitCode;

use clap::Parser;
use pat_cli::{init_tracing, run, Cli};
use tracing::error;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let reason = error.exit_reason();
            error!(exit_reason = %reason, "{error}");
            ExitCode::from(reason.code())
        }
    }
}
