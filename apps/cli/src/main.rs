//! # Velmo Entry Point
//!
//! ```text
//! $ velmo shop boutique-fanta --search riz
//! $ velmo cart add boutique-fanta 3f2a9c1b-... --qty 2
//! $ velmo checkout boutique-fanta --name Mariama --phone "622 11 22 33"
//! $ velmo receipt
//! ```
//!
//! Errors are printed to stderr and mapped to a non-zero exit status.

use std::process::ExitCode;

use clap::Parser;

use velmo_cli::commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    velmo_cli::init_tracing();

    match velmo_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.message);
            ExitCode::from(e.code.exit_code() as u8)
        }
    }
}
