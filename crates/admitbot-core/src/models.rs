//! Core data models used throughout admitbot.
//!
//! These types represent the leads, history entries, chat messages and
//! knowledge documents that flow between the HTTP layer, the answer
//! resolver and the stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source recorded on a lead when the submitter does not supply one.
pub const DEFAULT_LEAD_SOURCE: &str = "chatbot";

/// A knowledge document loaded from the documents directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full text content.
    pub content: String,
    /// File name the content was read from (e.g. `hostel.txt`).
    pub source: String,
}

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Enrolled,
}

impl LeadStatus {
    /// Every status, in pipeline order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Enrolled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Enrolled => "enrolled",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "enrolled" => Ok(LeadStatus::Enrolled),
            other => Err(LeadError::UnknownStatus(other.to_string())),
        }
    }
}

/// Validation failures for lead submissions and patches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadError {
    #[error("Name and email are required")]
    MissingRequired,
    #[error("unknown lead status '{0}': must be new, contacted, qualified or enrolled")]
    UnknownStatus(String),
}

/// A prospective student's contact submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub message: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw lead form fields as submitted by a client.
///
/// Every field is optional on the wire so that missing required fields are
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewLead {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NewLead {
    /// Validate the submission and build a fresh lead with status `new`.
    ///
    /// `name` and `email` must be present and non-blank. Optional fields
    /// default to the empty string and `source` defaults to
    /// [`DEFAULT_LEAD_SOURCE`].
    pub fn into_lead(self, now: DateTime<Utc>) -> Result<Lead, LeadError> {
        let name = non_blank(self.name).ok_or(LeadError::MissingRequired)?;
        let email = non_blank(self.email).ok_or(LeadError::MissingRequired)?;

        Ok(Lead {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            phone: self.phone.unwrap_or_default(),
            course: self.course.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            source: non_blank(self.source).unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
            timestamp: now,
            status: LeadStatus::New,
            notes: None,
            updated_at: None,
        })
    }
}

/// Partial update applied by `PATCH /api/leads/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadPatch {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated [`LeadPatch`]. Empty fields have already been dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadUpdate {
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
}

impl LeadPatch {
    /// Parse the status and drop empty values, which leave the lead unchanged.
    pub fn validate(self) -> Result<LeadUpdate, LeadError> {
        let status = match non_blank(self.status) {
            Some(s) => Some(s.trim().parse::<LeadStatus>()?),
            None => None,
        };
        Ok(LeadUpdate {
            status,
            notes: self.notes.filter(|n| !n.is_empty()),
        })
    }
}

impl Lead {
    /// Apply an update in place, stamping `updated_at`.
    pub fn apply(&mut self, update: &LeadUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = Some(now);
    }
}

/// One answered question in the server-side chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(question: &str, answer: &str, context: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            context: context.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::Bot => f.write_str("bot"),
        }
    }
}

/// A chat message held by a client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
