use std::process::ExitCode;

use clap::Parser;
use pipette::cli::{self, Cli};

fn main() -> ExitCode {
    pipette::logging::init();
    let cli = Cli::parse();

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("pipette: {err:#}");
            ExitCode::FAILURE
        }
    }
}
