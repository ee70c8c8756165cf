use clap::Parser;
use fetchpool_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; stderr when asked or when the
    // state log cannot be opened.
    let debug = cli.debug || logging::debug_from_env();
    if cli.log_stderr || logging::init_logging(debug).is_err() {
        logging::init_logging_stderr(debug);
    }

    if let Err(err) = cli.run().await {
        eprintln!("fetchpool error: {:#}", err);
        std::process::exit(1);
    }
}
