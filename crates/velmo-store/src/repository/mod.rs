//! # Repository Module
//!
//! Local storage repositories.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  db.carts().load(&shop.id)                                      │
//! │       ▼                                                                 │
//! │  CartRepository                  PreferencesRepository                  │
//! │  ├── load(shop_id)               ├── customer_info / save_customer_info │
//! │  ├── save(&cart)                 ├── favorites / toggle_favorite        │
//! │  └── clear(shop_id)              ├── record_view / view_counts          │
//! │                                  ├── last_order_ref / set_last_order_ref│
//! │                                  └── session_id                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are checked at runtime (`sqlx::query` / `query_as`), so building
//! the crate never needs a live database.

pub mod cart;
pub mod preferences;
