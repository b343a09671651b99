//! # Velmo CLI Library
//!
//! The `velmo` storefront client: browse a public shop, keep a cart on this
//! device and send it to the merchant as an order.
//!
//! ## Module Organization
//! ```text
//! velmo_cli/
//! ├── lib.rs          ◄─── You are here (logging, run)
//! ├── config.rs       ◄─── Layered settings (defaults → TOML → env)
//! ├── error.rs        ◄─── AppError shown to the shopper
//! ├── checkout.rs     ◄─── Cart → order → WhatsApp link
//! ├── terminal.rs     ◄─── Plain text output
//! └── commands/
//!     ├── mod.rs      ◄─── clap definitions, Context, dispatch
//!     ├── shop.rs     ◄─── shop, product, favorite, recommend
//!     ├── cart.rs     ◄─── cart subcommands
//!     └── order.rs    ◄─── checkout, receipt, track
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Parse the command line (clap)                                       │
//! │  2. Initialize logging on stderr (RUST_LOG or the default filter)       │
//! │  3. Load configuration                                                  │
//! │  4. Open the local SQLite store, run pending migrations                 │
//! │  5. Build the backend client                                            │
//! │  6. Run the command, writing results to stdout                          │
//! │  7. Close the store                                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod commands;
pub mod config;
pub mod error;
pub mod terminal;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{dispatch, Cli, Context};
use config::AppConfig;
use error::AppResult;
use terminal::Terminal;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,velmo=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output can be piped.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=velmo_backend=trace` - Trace the backend client only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one parsed command line to completion.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config)?;
    let ctx = Context::open(config).await?;
    info!("Velmo ready");

    let mut term = Terminal::stdout();
    let result = dispatch(cli.command, &ctx, &mut term).await;
    let flushed = term.flush();

    ctx.db.close().await;
    debug!("Local store closed");

    result.and(flushed)
}
