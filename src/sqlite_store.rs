//! SQLite-backed [`LeadStore`] and [`HistoryStore`] implementations.
//!
//! Timestamps are stored as RFC 3339 text and lead status as its
//! lower-case name. Insertion order is kept by an autoincrement `seq`
//! column, which is never exposed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use admitbot_core::models::{HistoryEntry, Lead, LeadStatus, LeadUpdate};
use admitbot_core::store::{HistoryStore, LeadStore};

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid stored timestamp: {}", raw))?
        .with_timezone(&Utc))
}

fn row_to_lead(row: &SqliteRow) -> Result<Lead> {
    let status: String = row.try_get("status")?;
    let timestamp: String = row.try_get("timestamp")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;

    Ok(Lead {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        course: row.try_get("course")?,
        message: row.try_get("message")?,
        source: row.try_get("source")?,
        timestamp: parse_ts(&timestamp)?,
        status: status.parse::<LeadStatus>()?,
        notes: row.try_get("notes")?,
        updated_at: updated_at.as_deref().map(parse_ts).transpose()?,
    })
}

const LEAD_COLUMNS: &str =
    "id, name, email, phone, course, message, source, timestamp, status, notes, updated_at";

pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn insert(&self, lead: &Lead) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO leads (id, name, email, phone, course, message, source,
                               timestamp, status, notes, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lead.id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.course)
        .bind(&lead.message)
        .bind(&lead.source)
        .bind(lead.timestamp.to_rfc3339())
        .bind(lead.status.as_str())
        .bind(&lead.notes)
        .bind(lead.updated_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Lead>> {
        let rows = sqlx::query(&format!("SELECT {} FROM leads ORDER BY seq", LEAD_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_lead).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Lead>> {
        let row = sqlx::query(&format!("SELECT {} FROM leads WHERE id = ?", LEAD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_lead).transpose()
    }

    // One statement, so the write lock is taken before anything is read.
    async fn update(&self, id: &str, update: &LeadUpdate) -> Result<Option<Lead>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE leads
            SET status = COALESCE(?, status),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(update.status.map(LeadStatus::as_str))
        .bind(&update.notes)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_lead).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct SqliteHistoryStore {
    pool: SqlitePool,
    capacity: usize,
}

impl SqliteHistoryStore {
    pub fn new(pool: SqlitePool, capacity: usize) -> Self {
        Self {
            pool,
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO chat_history (id, question, answer, context, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(&entry.context)
        .bind(entry.timestamp.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM chat_history WHERE seq NOT IN (SELECT seq FROM chat_history ORDER BY seq DESC LIMIT ?)",
        )
        .bind(self.capacity as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, answer, context, timestamp FROM (
                SELECT seq, id, question, answer, context, timestamp
                FROM chat_history ORDER BY seq DESC LIMIT ?
            ) ORDER BY seq ASC
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let timestamp: String = row.try_get("timestamp")?;
                Ok(HistoryEntry {
                    id: row.try_get("id")?,
                    question: row.try_get("question")?,
                    answer: row.try_get("answer")?,
                    context: row.try_get("context")?,
                    timestamp: parse_ts(&timestamp)?,
                })
            })
            .collect()
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM chat_history")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
