//! HTTP JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/chat` | Answer a question, append it to history |
//! | `GET` | `/api/chat/history?limit=N` | Last N history entries |
//! | `DELETE` | `/api/chat/history` | Clear history |
//! | `GET` | `/api/chat/suggestions` | Fixed list of suggested questions |
//! | `POST` | `/api/chat/rate` | Conversation rating (logged only) |
//! | `POST` | `/api/chat/report` | Issue report (logged only) |
//! | `POST` | `/api/leads` | Submit a lead |
//! | `GET` | `/api/leads` | All leads |
//! | `GET` | `/api/leads/analytics` | Aggregate lead counts |
//! | `GET` | `/api/leads/{id}` | One lead |
//! | `PATCH` | `/api/leads/{id}` | Update status and/or notes |
//! | `DELETE` | `/api/leads/{id}` | Remove a lead |
//! | `GET` | `/` | Liveness message |
//! | `GET` | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Name and email are required" }
//! ```
//!
//! Upstream failures add a `details` string. Status codes: 400 for
//! validation, 404 for unknown lead ids, 500 for document or store failures.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser chat
//! widget can be served from any host.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use admitbot_core::analytics::LeadAnalytics;
use admitbot_core::models::{HistoryEntry, Lead, LeadError, LeadPatch, NewLead};
use admitbot_core::store::memory::{InMemoryHistoryStore, InMemoryLeadStore};
use admitbot_core::store::{HistoryStore, LeadStore};

use crate::config::Config;
use crate::db;
use crate::notify::{self, Notifier};
use crate::resolver::Resolver;
use crate::sqlite_store::{SqliteHistoryStore, SqliteLeadStore};

/// Questions offered to visitors who do not know what to ask.
pub const SUGGESTIONS: [&str; 5] = [
    "What are the admission requirements?",
    "Tell me about the courses offered",
    "What is the fee structure?",
    "How do I apply for admission?",
    "What are the hostel facilities?",
];

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub leads: Arc<dyn LeadStore>,
    pub history: Arc<dyn HistoryStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Entries returned by `GET /api/chat/history` without `?limit=`.
    pub history_default_limit: usize,
}

impl AppState {
    /// Build state from config: stores per `[storage]`, notifier per `[mail]`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (leads, history): (Arc<dyn LeadStore>, Arc<dyn HistoryStore>) =
            if config.storage.is_sqlite() {
                let pool = db::connect(&config.storage).await?;
                db::migrate(&pool).await?;
                tracing::info!(path = %config.storage.path.display(), "using sqlite storage");
                (
                    Arc::new(SqliteLeadStore::new(pool.clone())),
                    Arc::new(SqliteHistoryStore::new(pool, config.history.capacity)),
                )
            } else {
                (
                    Arc::new(InMemoryLeadStore::new()),
                    Arc::new(InMemoryHistoryStore::with_capacity(
                        config.history.capacity,
                    )),
                )
            };

        let notifier = notify::from_config(&config.mail)?;
        tracing::info!(provider = notifier.name(), "mail notifier ready");

        Ok(Self {
            resolver: Arc::new(Resolver::new(config.documents.clone())),
            leads,
            history,
            notifier,
            history_default_limit: config.history.default_limit,
        })
    }
}

/// Assemble the router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .route(
            "/api/chat/history",
            get(handle_history).delete(handle_clear_history),
        )
        .route("/api/chat/suggestions", get(handle_suggestions))
        .route("/api/chat/rate", post(handle_rate))
        .route("/api/chat/report", post(handle_report))
        .route("/api/leads", post(handle_submit_lead).get(handle_list_leads))
        .route("/api/leads/analytics", get(handle_analytics))
        .route(
            "/api/leads/{id}",
            get(handle_get_lead)
                .patch(handle_patch_lead)
                .delete(handle_delete_lead),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, docs = %config.documents.dir.display(), "admitbot listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
        details: None,
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
        details: None,
    }
}

/// 500 with the full error chain in `details`.
fn internal(message: impl Into<String>, err: &anyhow::Error) -> AppError {
    let details = format!("{:#}", err);
    let message = message.into();
    tracing::error!(error = %details, "{}", message);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message,
        details: Some(details),
    }
}

impl From<LeadError> for AppError {
    fn from(err: LeadError) -> Self {
        bad_request(err.to_string())
    }
}

/// Turns a JSON extraction failure into our 400 shape.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        bad_request("Request body is missing or is not valid JSON")
    })
}

// ============ GET / and /health ============

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "College Chatbot API is running!" }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/chat ============

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

/// Handler for `POST /api/chat`.
///
/// Document loading is blocking file I/O, so resolution runs on the
/// blocking pool. Only successful answers are recorded in history.
async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let req = json_body(body)?;
    let question = req
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| bad_request("Question is required in request body"))?;
    let context = req.context.unwrap_or_default();

    let resolver = state.resolver.clone();
    let q = question.clone();
    let resolution = tokio::task::spawn_blocking(move || resolver.resolve(&q))
        .await
        .map_err(|e| internal("Error generating answer", &anyhow::Error::new(e)))?
        .map_err(|e| internal("Error generating answer", &e))?;

    let entry = HistoryEntry::new(&question, &resolution.answer, &context);
    state
        .history
        .append(&entry)
        .await
        .map_err(|e| internal("Failed to record chat history", &e))?;

    Ok(Json(ChatResponse {
        answer: resolution.answer,
    }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

async fn handle_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected history query");
        bad_request("limit must be a non-negative integer")
    })?;
    let limit = query.limit.unwrap_or(state.history_default_limit);
    let history = state
        .history
        .recent(limit)
        .await
        .map_err(|e| internal("Failed to read chat history", &e))?;
    Ok(Json(HistoryResponse { history }))
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

const SUCCESS: SuccessResponse = SuccessResponse { success: true };

async fn handle_clear_history(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .history
        .clear()
        .await
        .map_err(|e| internal("Failed to clear chat history", &e))?;
    Ok(Json(SUCCESS))
}

async fn handle_suggestions() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "suggestions": SUGGESTIONS }))
}

#[derive(Debug, Default, Deserialize)]
struct RateRequest {
    #[serde(default)]
    rating: Option<serde_json::Value>,
    #[serde(default)]
    feedback: Option<String>,
}

async fn handle_rate(body: Result<Json<RateRequest>, JsonRejection>) -> Json<SuccessResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    tracing::info!(rating = ?req.rating, feedback = ?req.feedback, "conversation rating");
    Json(SUCCESS)
}

#[derive(Debug, Default, Deserialize)]
struct ReportRequest {
    #[serde(default)]
    issue: Option<String>,
    #[serde(default)]
    context: Option<serde_json::Value>,
}

async fn handle_report(body: Result<Json<ReportRequest>, JsonRejection>) -> Json<SuccessResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    tracing::info!(issue = ?req.issue, context = ?req.context, "issue reported");
    Json(SUCCESS)
}

// ============ /api/leads ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitLeadResponse {
    success: bool,
    message: String,
    lead_id: String,
}

/// Handler for `POST /api/leads`.
///
/// The lead is stored before any email is attempted; email failures are
/// logged by [`notify::send_lead_emails`] and never fail the request.
async fn handle_submit_lead(
    State(state): State<AppState>,
    body: Result<Json<NewLead>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitLeadResponse>), AppError> {
    let lead = json_body(body)?.into_lead(Utc::now())?;

    state
        .leads
        .insert(&lead)
        .await
        .map_err(|e| internal("Failed to submit lead", &e))?;
    tracing::info!(lead_id = %lead.id, source = %lead.source, "lead submitted");

    notify::send_lead_emails(state.notifier.as_ref(), &lead).await;

    Ok((
        StatusCode::CREATED,
        Json(SubmitLeadResponse {
            success: true,
            message: "Lead submitted successfully".to_string(),
            lead_id: lead.id,
        }),
    ))
}

#[derive(Serialize)]
struct LeadListResponse {
    leads: Vec<Lead>,
}

async fn handle_list_leads(
    State(state): State<AppState>,
) -> Result<Json<LeadListResponse>, AppError> {
    let leads = state
        .leads
        .list()
        .await
        .map_err(|e| internal("Failed to list leads", &e))?;
    Ok(Json(LeadListResponse { leads }))
}

#[derive(Serialize)]
struct LeadResponse {
    lead: Lead,
}

async fn handle_get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LeadResponse>, AppError> {
    let lead = state
        .leads
        .get(&id)
        .await
        .map_err(|e| internal("Failed to read lead", &e))?
        .ok_or_else(|| not_found("Lead not found"))?;
    Ok(Json(LeadResponse { lead }))
}

#[derive(Serialize)]
struct PatchLeadResponse {
    success: bool,
    lead: Lead,
}

async fn handle_patch_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<LeadPatch>, JsonRejection>,
) -> Result<Json<PatchLeadResponse>, AppError> {
    let update = json_body(body)?.validate()?;
    let lead = state
        .leads
        .update(&id, &update)
        .await
        .map_err(|e| internal("Failed to update lead", &e))?
        .ok_or_else(|| not_found("Lead not found"))?;
    tracing::info!(lead_id = %lead.id, status = %lead.status, "lead updated");
    Ok(Json(PatchLeadResponse {
        success: true,
        lead,
    }))
}

async fn handle_delete_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let removed = state
        .leads
        .delete(&id)
        .await
        .map_err(|e| internal("Failed to delete lead", &e))?;
    if !removed {
        return Err(not_found("Lead not found"));
    }
    tracing::info!(lead_id = %id, "lead deleted");
    Ok(Json(SUCCESS))
}

async fn handle_analytics(
    State(state): State<AppState>,
) -> Result<Json<LeadAnalytics>, AppError> {
    let leads = state
        .leads
        .list()
        .await
        .map_err(|e| internal("Failed to compute analytics", &e))?;
    Ok(Json(LeadAnalytics::compute(&leads, &Local::now())))
}
