//! Lead notification emails.
//!
//! Two messages go out for every submitted lead: a notification to the
//! admissions office and a confirmation to the submitter. Delivery is best
//! effort; [`send_lead_emails`] logs failures and never returns them.
//!
//! The `http` provider posts `{from, to, subject, html}` with a bearer key
//! to a Resend-compatible endpoint. With mail disabled, messages are only
//! logged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use admitbot_core::models::Lead;

use crate::config::MailConfig;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email delivery backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Address that receives new-lead notifications, if one is configured.
    fn admin_address(&self) -> Option<&str>;

    async fn send(&self, email: &Email) -> Result<()>;
}

/// Build the notifier selected by `[mail].provider`.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Notifier>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(LogNotifier::new(config.admin_address()))),
        "http" => Ok(Arc::new(HttpMailNotifier::new(config)?)),
        other => bail!("Unknown mail provider: '{}'", other),
    }
}

/// Send the admin notification and the user confirmation for `lead`.
///
/// Each send is attempted independently; failures are logged and swallowed.
pub async fn send_lead_emails(notifier: &dyn Notifier, lead: &Lead) {
    match notifier.admin_address() {
        Some(admin) => {
            let email = admin_notification(lead, admin);
            if let Err(e) = notifier.send(&email).await {
                let error = format!("{:#}", e);
                tracing::warn!(lead_id = %lead.id, %error, "Email notification failed");
            }
        }
        None => {
            tracing::warn!(lead_id = %lead.id, "no admin address configured, skipping lead notification");
        }
    }

    let email = user_confirmation(lead);
    if let Err(e) = notifier.send(&email).await {
        let error = format!("{:#}", e);
        tracing::warn!(lead_id = %lead.id, %error, "User confirmation email failed");
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn admin_notification(lead: &Lead, admin: &str) -> Email {
    let subject = format!(
        "New Lead: {} - {}",
        lead.name,
        or_placeholder(&lead.course, "General Inquiry")
    );
    let html = format!(
        "<h2>New Lead Submission</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Phone:</strong> {}</p>\n\
         <p><strong>Course:</strong> {}</p>\n\
         <p><strong>Message:</strong> {}</p>\n\
         <p><strong>Source:</strong> {}</p>\n\
         <p><strong>Submitted:</strong> {}</p>\n",
        escape_html(&lead.name),
        escape_html(&lead.email),
        escape_html(or_placeholder(&lead.phone, "Not provided")),
        escape_html(or_placeholder(&lead.course, "Not specified")),
        escape_html(or_placeholder(&lead.message, "No additional message")),
        escape_html(&lead.source),
        lead.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    Email {
        to: admin.to_string(),
        subject,
        html,
    }
}

pub fn user_confirmation(lead: &Lead) -> Email {
    let html = format!(
        "<h2>Thank you for your inquiry!</h2>\n\
         <p>Dear {},</p>\n\
         <p>Thank you for contacting us about {}. We have received your inquiry and our admissions team will get back to you within 24-48 hours.</p>\n\
         <p><strong>Your inquiry details:</strong></p>\n\
         <ul>\n<li>Course: {}</li>\n<li>Message: {}</li>\n</ul>\n\
         <p>In the meantime, you can:</p>\n\
         <ul>\n<li>Visit our website: www.college.edu</li>\n<li>Call us: +1-555-123-4568</li>\n<li>Email us: admissions@college.edu</li>\n</ul>\n\
         <p>Best regards,<br>Admissions Team</p>\n",
        escape_html(&lead.name),
        escape_html(or_placeholder(&lead.course, "our programs")),
        escape_html(or_placeholder(&lead.course, "General inquiry")),
        escape_html(or_placeholder(&lead.message, "No additional message")),
    );
    Email {
        to: lead.email.clone(),
        subject: "Thank you for your inquiry - College Admission".to_string(),
        html,
    }
}

/// Logs emails instead of sending them.
pub struct LogNotifier {
    admin: Option<String>,
}

impl LogNotifier {
    pub fn new(admin: Option<&str>) -> Self {
        Self {
            admin: admin.map(String::from),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "disabled"
    }

    fn admin_address(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    async fn send(&self, email: &Email) -> Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "mail disabled, not sending");
        Ok(())
    }
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends mail through a Resend-compatible HTTP API.
pub struct HttpMailNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    admin: Option<String>,
}

impl HttpMailNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("mail.api_key (or EMAIL_PASS) is required for the http mail provider")?;
        let from = config
            .from
            .clone()
            .context("mail.from (or EMAIL_USER) is required for the http mail provider")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            from,
            admin: config.admin_address().map(String::from),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    fn name(&self) -> &str {
        "http"
    }

    fn admin_address(&self) -> Option<&str> {
        self.admin.as_deref()
    }

    async fn send(&self, email: &Email) -> Result<()> {
        let payload = MailPayload {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("mail API request to {} failed", self.api_url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("mail API returned {}: {}", status, body);
        }

        tracing::debug!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}
