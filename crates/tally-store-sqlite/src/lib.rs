//! SQLite backend for the Tally subject store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Live subscriptions are served from
//! in-process [`tokio::sync::watch`] channels that are refreshed after every
//! committed write.

mod encode;
mod feed;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
