//! HTTP JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/lookup-definition` | Aggregated term lookup (alias `/api/lookup/definition`) |
//! | `POST` | `/sentence-analyzer` | Sentence analysis (alias `/api/lookup/sentence-analyzer`) |
//! | `POST` | `/chat` | DocsBuddy chat (alias `/api/chat`) |
//! | `POST` | `/extract-terms` | Pick lookup candidates out of text |
//! | `POST` | `/response-lookup` | Insights and suggestions for an assistant reply |
//! | `GET`  | `/ai-status` | Process-wide AI availability |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses carry a single human-readable message:
//!
//! ```json
//! { "error": "Term is required" }
//! ```
//!
//! Lookup is the exception on internal failure: its 500 response also
//! embeds a `fallback` record so the UI still has something to show.
//!
//! Lookups never fail because a source is down; an unreachable dictionary
//! or Wikipedia only changes the record's content. Only missing input is
//! reported as an error.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser UI can
//! call the API from another port during development.

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyzer::{SentenceAnalyzer, DEFAULT_ANALYSIS_TYPE};
use crate::chat::DocsBuddyChat;
use crate::completion::{create_client, AiError};
use crate::config::Config;
use crate::glossary::extract_lookup_terms;
use crate::insights::{lookup_response, ResponseLookup};
use crate::lookup::{fallback_lookup, SharedAggregator, TermLookupAggregator};
use crate::models::{AiStatus, ChatMessage, LookupRecord};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: SharedAggregator,
    pub analyzer: Arc<SentenceAnalyzer>,
    pub chat: Arc<DocsBuddyChat>,
    /// Probed once at startup.
    pub ai_status: AiStatus,
}

impl AppState {
    /// Wire up the standard sources and completion client from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let ai_status = AiStatus::probe(&config.ai);
        let client = create_client(&config.ai)?;

        Ok(Self {
            aggregator: Arc::new(TermLookupAggregator::from_config(&config.lookup, ai_status)?),
            analyzer: Arc::new(SentenceAnalyzer::new(client.clone(), &config.ai)),
            chat: Arc::new(DocsBuddyChat::new(client, &config.ai)),
            ai_status,
        })
    }
}

/// Build the router for `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/lookup-definition", lookup_route())
        .route("/api/lookup/definition", lookup_route())
        .route("/sentence-analyzer", sentence_analyzer_route())
        .route("/api/lookup/sentence-analyzer", sentence_analyzer_route())
        .route("/chat", chat_route())
        .route("/api/chat", chat_route())
        .route("/extract-terms", post(handle_extract_terms))
        .route("/response-lookup", post(handle_response_lookup))
        .route("/ai-status", get(handle_ai_status))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn lookup_route() -> MethodRouter<AppState> {
    post(handle_lookup).fallback(handle_method_not_allowed)
}

/// Non-POST requests to the analyzer answer 400 rather than 405.
fn sentence_analyzer_route() -> MethodRouter<AppState> {
    post(handle_sentence_analyzer).fallback(handle_not_post)
}

fn chat_route() -> MethodRouter<AppState> {
    post(handle_chat).fallback(handle_method_not_allowed)
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    run_server_with_state(config, state).await
}

/// Like [`run_server`], but with caller-assembled state (custom sources or
/// completion backends).
pub async fn run_server_with_state(config: &Config, state: AppState) -> Result<()> {
    let bind_addr = config.server.bind.clone();
    tracing::info!(
        ai = ?state.ai_status.status,
        "DocsBuddy server listening on http://{}",
        bind_addr
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<LookupRecord>,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    fallback: Option<LookupRecord>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            fallback: self.fallback,
        };
        (self.status, Json(body)).into_response()
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> AppError {
    AppError {
        status,
        message: message.into(),
        fallback: None,
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    error(StatusCode::BAD_REQUEST, message)
}

/// User-facing texts for the AI failures a caller can act on.
struct AiErrorMessages {
    invalid_key: &'static str,
    quota: &'static str,
}

const ANALYZER_AI_ERRORS: AiErrorMessages = AiErrorMessages {
    invalid_key: "Invalid API key. Please check your OPENAI_API_KEY.",
    quota: "Lookup API quota exceeded. Please check your OpenAI billing settings.",
};

const CHAT_AI_ERRORS: AiErrorMessages = AiErrorMessages {
    invalid_key: "Invalid API key. Please check your OpenAI API key.",
    quota: "API quota exceeded. Please check your OpenAI billing settings.",
};

/// Map upstream AI failures that the user can act on.
///
/// Returns `None` for errors that should degrade instead of surfacing.
fn actionable_ai_error(err: &AiError, messages: &AiErrorMessages) -> Option<AppError> {
    match err {
        AiError::InvalidApiKey => Some(error(StatusCode::UNAUTHORIZED, messages.invalid_key)),
        AiError::QuotaExceeded => Some(error(StatusCode::TOO_MANY_REQUESTS, messages.quota)),
        _ => None,
    }
}

/// Pull a required, non-blank string out of an optional request field.
fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| bad_request(message))
}

// ============ GET /health ============

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

// ============ GET /ai-status ============

async fn handle_ai_status(State(state): State<AppState>) -> Json<AiStatus> {
    Json(state.ai_status)
}

// ============ POST /lookup-definition ============

#[derive(Deserialize)]
struct LookupRequest {
    term: Option<String>,
}

/// Handler for `POST /lookup-definition`.
///
/// The lookup runs on its own task; if that task dies the caller still
/// gets a fallback record inside the 500 body.
async fn handle_lookup(
    State(state): State<AppState>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupRecord>, AppError> {
    let term = payload.ok().and_then(|Json(req)| req.term);
    let term = required(term, "Term is required")?;

    let aggregator = state.aggregator.clone();
    let task_term = term.clone();
    match tokio::spawn(async move { aggregator.lookup(&task_term).await }).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!(term = %term, error = %e, "lookup task failed");
            Err(AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal server error".to_string(),
                fallback: Some(fallback_lookup(&term, state.ai_status)),
            })
        }
    }
}

// ============ POST /sentence-analyzer ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentenceRequest {
    sentence: Option<String>,
    analysis_type: Option<String>,
}

/// Handler for `POST /sentence-analyzer`.
///
/// Invalid key → 401, quota → 429; every other failure (including a missing
/// credential) answers 200 with the templated fallback.
async fn handle_sentence_analyzer(
    State(state): State<AppState>,
    payload: Result<Json<SentenceRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let (sentence, analysis_type) = match payload {
        Ok(Json(req)) => (req.sentence, req.analysis_type),
        Err(_) => (None, None),
    };
    let sentence = required(sentence, "Sentence is required")?;
    let analysis_type = analysis_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ANALYSIS_TYPE.to_string());

    match state.analyzer.try_analyze(&sentence, &analysis_type).await {
        Ok(analysis) => Ok(Json(analysis).into_response()),
        Err(e) => {
            if let Some(app_err) = actionable_ai_error(&e, &ANALYZER_AI_ERRORS) {
                tracing::warn!(error = %e, "sentence analysis rejected upstream");
                return Err(app_err);
            }
            Ok(Json(state.analyzer.fallback(&sentence, &analysis_type, &e)).into_response())
        }
    }
}

async fn handle_not_post() -> AppError {
    bad_request("Method not allowed")
}

async fn handle_method_not_allowed() -> AppError {
    error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

// ============ POST /chat ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    message: Option<String>,
    #[serde(default)]
    conversation_history: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// Handler for `POST /chat`.
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let (message, history) = match payload {
        Ok(Json(req)) => (req.message, req.conversation_history),
        Err(_) => (None, Vec::new()),
    };
    let message = required(message, "Message is required")?;

    match state.chat.reply(&message, &history).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            tracing::error!(error = %e, "chat completion failed");
            if let Some(app_err) = actionable_ai_error(&e, &CHAT_AI_ERRORS) {
                return Err(app_err);
            }
            Err(match e {
                AiError::MissingCredential => error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "AI chat is not configured. Add OPENAI_API_KEY to your .env.local.",
                ),
                _ => error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while processing your request. Please try again.",
                ),
            })
        }
    }
}

// ============ POST /extract-terms ============

#[derive(Deserialize)]
struct ExtractRequest {
    text: Option<String>,
}

#[derive(Serialize)]
struct ExtractResponse {
    terms: Vec<String>,
}

async fn handle_extract_terms(
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    let text = payload.ok().and_then(|Json(req)| req.text);
    let text = text.ok_or_else(|| bad_request("Text is required"))?;

    Ok(Json(ExtractResponse {
        terms: extract_lookup_terms(&text),
    }))
}

// ============ POST /response-lookup ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseLookupRequest {
    response: Option<String>,
    #[serde(default)]
    user_query: String,
}

/// Handler for `POST /response-lookup`.
async fn handle_response_lookup(
    payload: Result<Json<ResponseLookupRequest>, JsonRejection>,
) -> Result<Json<ResponseLookup>, AppError> {
    let (response, user_query) = match payload {
        Ok(Json(req)) => (req.response, req.user_query),
        Err(_) => (None, String::new()),
    };
    let response = required(response, "Response is required")?;

    Ok(Json(lookup_response(&response, &user_query)))
}
