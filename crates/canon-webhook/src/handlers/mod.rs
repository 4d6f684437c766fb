//! Route handlers, one module per resource.

pub mod contacts;
pub mod webhook;
