mod ui;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use crate::ui::cli;
use log::debug;
use upstage_core::utils::logging::init_logging;
use upstage_core::StoreError;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = cli::run_cli(args, &mut out).and_then(|()| out.flush().map_err(StoreError::from));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {e:?}");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
