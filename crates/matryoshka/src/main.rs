use std::process::ExitCode;

use clap::Parser;

mod cli;
mod logging;
mod report;

fn main() -> ExitCode {
    let app = cli::App::parse();
    logging::init_console(app.log_level());

    match cli::run::run(&app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
