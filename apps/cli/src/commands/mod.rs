//! # Commands Module
//!
//! Every `velmo` subcommand.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (clap definitions, Context, dispatch)
//! ├── shop.rs     ◄─── shop, product, favorite, recommend
//! ├── cart.rs     ◄─── cart show/add/inc/dec/set/remove/clear
//! └── order.rs    ◄─── checkout, receipt, track
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  $ velmo cart add boutique-fanta 3f2a9c1b-... --qty 2                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Cli::parse() ──► AppConfig::load() ──► Context::open()                 │
//! │                                          (SQLite + BackendClient)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(Command::Cart(..)) ──► cart::run(ctx, term, action)           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Terminal (stdout)            tracing (stderr)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod order;
pub mod shop;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use velmo_backend::{BackendClient, BackendError, Catalog};
use velmo_core::catalog::SortOrder;
use velmo_core::validation::validate_slug;
use velmo_core::{Shop, ShopEvent};
use velmo_store::{Database, DbConfig};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::terminal::Terminal;

// =============================================================================
// Command Line
// =============================================================================

/// Browse a Velmo shop, fill a cart and order over WhatsApp.
#[derive(Debug, Parser)]
#[command(name = "velmo", version, about)]
pub struct Cli {
    /// Config file (default: $VELMO_CONFIG or the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a shop and its products.
    Shop(ShopArgs),

    /// Show one product (counts as a view).
    Product { slug: String, product_id: String },

    /// Manage the cart of a shop.
    #[command(subcommand)]
    Cart(CartAction),

    /// Add or remove a favorite.
    Favorite { slug: String, product_id: String },

    /// Products picked from your favorites and views.
    Recommend { slug: String },

    /// Send the cart as an order.
    Checkout(CheckoutArgs),

    /// Print the receipt of an order (default: the last one).
    Receipt {
        /// Order id or short reference.
        reference: Option<String>,

        /// Columns: 32, 42 or 48.
        #[arg(long)]
        width: Option<usize>,
    },

    /// Show the last order reference and its status.
    Track,
}

#[derive(Debug, Args)]
pub struct ShopArgs {
    pub slug: String,

    /// Match product name or description.
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub category: Option<String>,

    /// Active products only.
    #[arg(long, conflicts_with = "new")]
    pub available: bool,

    /// Products added in the last 7 days.
    #[arg(long)]
    pub new: bool,

    #[arg(long, value_enum, default_value_t = SortArg::Default)]
    pub sort: SortArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Default,
    PriceAsc,
    PriceDesc,
    Name,
    Popular,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Default => SortOrder::Default,
            SortArg::PriceAsc => SortOrder::PriceAsc,
            SortArg::PriceDesc => SortOrder::PriceDesc,
            SortArg::Name => SortOrder::Name,
            SortArg::Popular => SortOrder::Popular,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// List the cart lines and total.
    Show { slug: String },

    /// Add a product.
    Add {
        slug: String,
        product_id: String,
        #[arg(long, default_value_t = 1)]
        qty: i64,
    },

    /// One more of a product already in the cart.
    Inc { slug: String, product_id: String },

    /// One less; the line goes away at zero.
    Dec { slug: String, product_id: String },

    /// Set a quantity; zero removes the line.
    Set {
        slug: String,
        product_id: String,
        qty: i64,
    },

    /// Remove a line.
    Remove { slug: String, product_id: String },

    /// Empty the cart.
    Clear { slug: String },
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    pub slug: String,

    /// Defaults to the name used last time.
    #[arg(long)]
    pub name: Option<String>,

    /// Defaults to the phone used last time.
    #[arg(long)]
    pub phone: Option<String>,

    /// Required with --delivery.
    #[arg(long)]
    pub address: Option<String>,

    /// Home delivery instead of pickup.
    #[arg(long)]
    pub delivery: bool,

    #[arg(long)]
    pub note: Option<String>,

    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

// =============================================================================
// Context
// =============================================================================

/// Everything a command may need.
pub struct Context {
    pub config: AppConfig,
    pub db: Database,
    pub backend: BackendClient,
}

impl Context {
    /// Opens the local store and builds the backend client.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let db_path = config.database_path()?;
        let db = Database::new(DbConfig::new(db_path)).await?;
        let backend = BackendClient::new(config.backend_config()?)?;

        Ok(Context {
            config,
            db,
            backend,
        })
    }

    /// Public shop by slug, with the configured currency as fallback.
    pub async fn shop(&self, slug: &str) -> AppResult<Shop> {
        let slug = validate_slug(slug)?;
        let mut shop = self
            .backend
            .shop_by_slug(&slug)
            .await
            .map_err(|e| shop_error(e, &slug))?;
        self.default_currency(&mut shop);
        Ok(shop)
    }

    /// Shop and its products.
    pub async fn catalog(&self, slug: &str) -> AppResult<Catalog> {
        let slug = validate_slug(slug)?;
        let mut catalog = self
            .backend
            .load_catalog(&slug)
            .await
            .map_err(|e| shop_error(e, &slug))?;
        self.default_currency(&mut catalog.shop);
        Ok(catalog)
    }

    fn default_currency(&self, shop: &mut Shop) {
        let blank = shop.currency.as_deref().map_or(true, |c| c.trim().is_empty());
        if blank {
            shop.currency = Some(self.config.currency().to_string());
        }
    }

    /// Sends an analytics event tagged with this device's session.
    pub async fn track(&self, event: impl FnOnce(String) -> ShopEvent) {
        match self.db.preferences().session_id().await {
            Ok(session_id) => self.backend.record_event(&event(session_id)).await,
            Err(e) => warn!(error = %e, "No analytics session, event dropped"),
        }
    }
}

fn shop_error(err: BackendError, slug: &str) -> AppError {
    match err {
        BackendError::NotFound(_) => AppError::not_found(format!("Boutique introuvable: {slug}")),
        other => other.into(),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command.
pub async fn dispatch<W: Write>(
    command: Command,
    ctx: &Context,
    term: &mut Terminal<W>,
) -> AppResult<()> {
    info!(command = ?command, "Running command");

    match command {
        Command::Shop(args) => shop::show(ctx, term, args).await,
        Command::Product { slug, product_id } => {
            shop::product(ctx, term, &slug, &product_id).await
        }
        Command::Cart(action) => cart::run(ctx, term, action).await,
        Command::Favorite { slug, product_id } => {
            shop::favorite(ctx, term, &slug, &product_id).await
        }
        Command::Recommend { slug } => shop::recommend(ctx, term, &slug).await,
        Command::Checkout(args) => order::checkout(ctx, term, args).await,
        Command::Receipt { reference, width } => {
            order::receipt(ctx, term, reference.as_deref(), width).await
        }
        Command::Track => order::track(ctx, term).await,
    }
}
