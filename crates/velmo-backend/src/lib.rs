//! # velmo-backend: Hosted Backend Client
//!
//! Everything the storefront reads from or writes to the hosted database
//! goes through [`BackendClient`], a thin typed layer over its REST API.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          BackendClient                                  │
//! │                                                                         │
//! │  Catalog (catalog.rs)                                                   │
//! │  • shop_by_slug(slug)       public shop, case-insensitive slug          │
//! │  • shop_by_id(id)                                                       │
//! │  • products_for_shop(id)    active + visible, by name                   │
//! │  • load_catalog(slug)       both of the above                           │
//! │                                                                         │
//! │  Orders (orders.rs)                                                     │
//! │  • insert_order(order)      → OrderReceipt { id, short_ref }            │
//! │  • order_by_reference(ref)  uuid or short ref                           │
//! │  • order_with_shop(ref)     order + shop header for the receipt         │
//! │                                                                         │
//! │  Events (events.rs)                                                     │
//! │  • record_event(event)      best-effort analytics                       │
//! │                                                                         │
//! │  Media (media.rs)                                                       │
//! │  • public_media_url(path)   bucket path → public URL                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client never retries; see [`BackendError::is_transient`].

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod orders;

pub use catalog::Catalog;
pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
