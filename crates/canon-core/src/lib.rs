//! Identity resolution and record merging for contact webhooks.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::RecordStore`]; transports drive
//! [`engine::MergeEngine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod fragment;
pub mod identity;
pub mod lock;
pub mod merge;
pub mod phone;
pub mod record;
pub mod store;

pub use error::{Error, Result};
