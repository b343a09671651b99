//! # velmo-store: On-Device Storage for the Velmo Storefront
//!
//! Everything the storefront remembers between runs: the cart of each shop,
//! the shopper's contact details, favorites, view counters and the last
//! order reference. SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Velmo Storefront Data Flow                          │
//! │                                                                         │
//! │  velmo cart add boutique-kaloum <product>                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   velmo-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                 │   │  (embedded)  │  │   │
//! │  │   │               │    │ CartRepository  │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Preferences-    │   │ 001_local_   │  │   │
//! │  │   │               │    │   Repository    │   │  storage.sql │  │   │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/velmo/velmo.db                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the store, `Database` handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Cart and preferences repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use velmo_store::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("velmo.db")).await?;
//!
//! let mut cart = db.carts().load(&shop.id).await?;
//! cart.add_item(&product, 1)?;
//! db.carts().save(&cart).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, StoreLocation};

pub use repository::cart::CartRepository;
pub use repository::preferences::PreferencesRepository;
