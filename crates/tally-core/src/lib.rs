//! Core types and the attendance engine for Tally.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! calculators, summary and advisor are pure; the only I/O-shaped item is the
//! [`store::SubjectStore`] trait that backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod advisor;
pub mod attendance;
pub mod error;
pub mod store;
pub mod subject;
pub mod summary;
pub mod user;

pub use error::{Error, Result};
