//! # admitbot core
//!
//! Shared logic for admitbot: data models, the ordered answer rules,
//! keyword context selection, lead analytics, lead-form triggers, the
//! chat session container and the store traits with in-memory backends.
//!
//! This crate contains no tokio, HTTP, or filesystem I/O.

pub mod analytics;
pub mod context;
pub mod models;
pub mod rules;
pub mod session;
pub mod store;
pub mod trigger;
