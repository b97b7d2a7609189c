//! In-memory store implementations.
//!
//! Leads live in a `Vec` and history in a bounded `VecDeque`, both behind
//! `std::sync::RwLock`. Locks are never held across an `.await`.

use std::collections::VecDeque;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{HistoryEntry, Lead, LeadUpdate};

use super::{HistoryStore, LeadStore};

/// Default number of history entries kept before the oldest is dropped.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

fn poisoned(what: &str) -> anyhow::Error {
    anyhow!("{} lock poisoned", what)
}

/// In-memory lead store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert(&self, lead: &Lead) -> Result<()> {
        let mut leads = self.leads.write().map_err(|_| poisoned("lead store"))?;
        leads.push(lead.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Lead>> {
        let leads = self.leads.read().map_err(|_| poisoned("lead store"))?;
        Ok(leads.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Lead>> {
        let leads = self.leads.read().map_err(|_| poisoned("lead store"))?;
        Ok(leads.iter().find(|l| l.id == id).cloned())
    }

    async fn update(&self, id: &str, update: &LeadUpdate) -> Result<Option<Lead>> {
        let mut leads = self.leads.write().map_err(|_| poisoned("lead store"))?;
        Ok(leads.iter_mut().find(|l| l.id == id).map(|lead| {
            lead.apply(update, Utc::now());
            lead.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut leads = self.leads.write().map_err(|_| poisoned("lead store"))?;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        Ok(leads.len() != before)
    }
}

/// Bounded in-memory history ring.
pub struct InMemoryHistoryStore {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// `capacity` is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("history"))?;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().map_err(|_| poisoned("history"))?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.iter().skip(skip).cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().map_err(|_| poisoned("history"))?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::LeadAnalytics;
    use crate::models::{LeadStatus, NewLead};
    use std::sync::Arc;

    fn lead(name: &str) -> Lead {
        NewLead {
            name: Some(name.into()),
            email: Some(format!("{}@x.com", name)),
            ..Default::default()
        }
        .into_lead(Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn test_lead_crud() {
        let store = InMemoryLeadStore::new();
        let jo = lead("jo");
        store.insert(&jo).await.unwrap();
        store.insert(&lead("sam")).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(store.get(&jo.id).await.unwrap().unwrap().name, "jo");
        assert!(store.get("missing").await.unwrap().is_none());

        let update = LeadUpdate {
            status: Some(LeadStatus::Enrolled),
            notes: Some("paid".into()),
        };
        let updated = store.update(&jo.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.status, LeadStatus::Enrolled);
        assert!(store.update("missing", &update).await.unwrap().is_none());

        assert!(store.delete(&jo.id).await.unwrap());
        assert!(!store.delete(&jo.id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_emails_allowed() {
        let store = InMemoryLeadStore::new();
        store.insert(&lead("jo")).await.unwrap();
        store.insert(&lead("jo")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_history_recent_and_clear() {
        let store = InMemoryHistoryStore::new();
        for i in 0..5 {
            store
                .append(&HistoryEntry::new(&format!("q{}", i), "a", ""))
                .await
                .unwrap();
        }
        let last_two = store.recent(2).await.unwrap();
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].question, "q3");
        assert_eq!(last_two[1].question, "q4");
        assert_eq!(store.recent(50).await.unwrap().len(), 5);
        assert!(store.recent(0).await.unwrap().is_empty());

        store.clear().await.unwrap();
        assert!(store.recent(50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_ring_drops_oldest() {
        let store = InMemoryHistoryStore::with_capacity(3);
        for i in 0..5 {
            store
                .append(&HistoryEntry::new(&format!("q{}", i), "a", ""))
                .await
                .unwrap();
        }
        let all = store.recent(10).await.unwrap();
        let questions: Vec<&str> = all.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q2", "q3", "q4"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_insert_update_list() {
        let store = Arc::new(InMemoryLeadStore::new());
        let history = Arc::new(InMemoryHistoryStore::with_capacity(100));

        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            let history = history.clone();
            tasks.push(tokio::spawn(async move {
                let lead = lead(&format!("lead{}", i));
                store.insert(&lead).await?;
                let update = LeadUpdate {
                    status: Some(LeadStatus::Contacted),
                    notes: None,
                };
                store.update(&lead.id, &update).await?;
                history
                    .append(&HistoryEntry::new(&format!("q{}", i), "a", ""))
                    .await?;
                store.list().await?;
                Ok::<_, anyhow::Error>(())
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 50);
        let analytics = LeadAnalytics::compute(&all, &Utc::now());
        assert_eq!(analytics.total_leads, 50);
        assert_eq!(analytics.status_breakdown[&LeadStatus::Contacted], 50);
        assert_eq!(history.recent(100).await.unwrap().len(), 50);
    }
}
