//! # Ludex
//!
//! A game catalog browser with per-user bookmarks that stay readable offline.
//!
//! ## Architecture
//!
//! ```text
//! CatalogClient → CatalogFeed ──────────→ UI
//!              ↘ DetailResolver ← Store ↗
//!                              ↖ Bookmarks
//! ```
//!
//! - [`feed`]: debounced search with forward-only pagination
//! - [`detail`]: detail lookup, bookmark snapshot first
//! - [`bookmarks`]: serialized per-user bookmark toggling
//! - [`store`]: SQLite persistence layer
//!
//! ## Quick Start
//!
//! ```bash
//! ludex register Ada ada@example.com secret
//! ludex login ada@example.com secret
//!
//! # Browse, or search, three pages deep
//! ludex browse --query zelda --pages 3
//!
//! # Inspect and bookmark an item
//! ludex show 3328
//! ludex bookmark 3328
//! ludex bookmarks
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, catalog client, session, auth, bookmarks, detail resolver.
pub mod app;

/// Local accounts and the login that scopes bookmarks.
pub mod auth;

/// Per-user bookmarks.
///
/// - [`Bookmarks`](bookmarks::Bookmarks): toggle, list and observe bookmarks
pub mod bookmarks;

/// Command-line interface using clap.
///
/// - `register`, `login`, `logout`, `whoami` - account management
/// - `browse [--query Q] [--pages N]` - list catalog items
/// - `show <id>` - item details and screenshots
/// - `bookmark <id>` - toggle a bookmark
/// - `bookmarks` - list bookmarks
/// - `open <id>` - open the item's website
pub mod cli;

/// Remote catalog access.
///
/// - [`CatalogClient`](client::CatalogClient): Async trait for catalog queries
/// - [`HttpCatalogClient`](client::HttpCatalogClient): reqwest-based implementation
pub mod client;

/// Configuration loaded from `~/.config/ludex/config.toml`.
pub mod config;

/// Item detail resolution.
pub mod detail;

/// Core domain models.
///
/// - [`CatalogItem`](domain::CatalogItem): List-view summary
/// - [`CatalogDetail`](domain::CatalogDetail): Full record for one item
/// - [`BookmarkRecord`](domain::BookmarkRecord): Stored per-user snapshot
pub mod domain;

/// Paginated, debounced catalog feed.
pub mod feed;

/// Persisted login state.
pub mod session;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
