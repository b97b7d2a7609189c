//! Storage abstraction for leads and chat history.
//!
//! The [`LeadStore`] and [`HistoryStore`] traits are what the HTTP layer
//! talks to, so tests can swap in the in-memory implementations and a
//! deployment can back them with SQLite without touching the handlers.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{HistoryEntry, Lead, LeadUpdate};

/// Abstract lead storage.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](LeadStore::insert) | Store a newly submitted lead |
/// | [`list`](LeadStore::list) | All leads in submission order |
/// | [`get`](LeadStore::get) | One lead by id |
/// | [`update`](LeadStore::update) | Apply a status/notes update |
/// | [`delete`](LeadStore::delete) | Remove a lead (admin action) |
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert(&self, lead: &Lead) -> Result<()>;

    async fn list(&self) -> Result<Vec<Lead>>;

    /// Returns `Ok(None)` for an unknown id.
    async fn get(&self, id: &str) -> Result<Option<Lead>>;

    /// Apply `update` and return the updated lead, or `Ok(None)` for an unknown id.
    async fn update(&self, id: &str, update: &LeadUpdate) -> Result<Option<Lead>>;

    /// Returns `Ok(false)` for an unknown id.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Abstract chat history log.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: &HistoryEntry) -> Result<()>;

    /// The last `limit` entries, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;

    async fn clear(&self) -> Result<()>;
}
