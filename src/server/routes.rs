//! Axum route handlers for the temple oracle HTTP server.
//!
//! # Routes
//!
//! - `GET  /`                  — Welcome + endpoint index
//! - `GET  /health`            — Liveness probe with module statuses
//! - `POST /ask`               — Question → persona-dispatched answer
//! - `POST /whisper`           — Audio question → transcription, answer, speech
//! - `POST /upload_scroll`     — Ingest a document into the scroll corpus
//! - `GET  /scrolls`           — Full corpus dump
//! - `POST /reset_scrolls`     — Delete uploads and truncate the corpus
//! - `POST /register`          — Register a seeker identity
//! - `GET  /audio/*`           — Synthesized speech files
//! - `POST /inquiry/submit`, `GET /inquiry/history/:id`
//! - `POST /voice/process`, `GET /voice/status`
//! - `POST /value/contribute`, `GET /value/transaction/:id`, `GET /value/status`

use std::fs;
use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::ledger::{self, UsageClass};
use crate::modules::inquiry::InquiryType;
use crate::modules::ModuleRegistry;
use crate::observer;
use crate::oracle::providers::{AudioGateway, OpenAICompletion};
use crate::oracle::{self, Dispatcher};
use crate::scrolls;
use crate::store::TempleStore;
use crate::transcript::{self, InteractionEntry, InteractionParams};
use crate::utilities::config::Settings;
use crate::utilities::errors::OracleError;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration.
    pub settings: Arc<Settings>,
    /// File-backed collections.
    pub store: Arc<TempleStore>,
    /// Persona → provider routing.
    pub dispatcher: Arc<Dispatcher>,
    /// Speech-to-text / text-to-speech backend.
    pub audio: Arc<dyn AudioGateway>,
    /// Modular API state, dependency-injected.
    pub modules: Arc<ModuleRegistry>,
}

impl AppState {
    /// Wire real providers and the file store from settings.
    pub fn from_settings(settings: Settings) -> std::io::Result<Self> {
        let store = Arc::new(TempleStore::new(&settings.data_dir)?);
        let dispatcher = Arc::new(Dispatcher::from_settings(&settings));
        let audio: Arc<dyn AudioGateway> = Arc::new(OpenAICompletion::new(
            oracle::MOSES_MODEL,
            settings.openai_api_key.clone(),
            None,
        ));
        let modules = Arc::new(ModuleRegistry::from_settings(&settings, audio.clone()));
        Ok(Self {
            settings: Arc::new(settings),
            store,
            dispatcher,
            audio,
            modules,
        })
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    let audio_dir = state.settings.audio_dir();
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ask", post(ask_handler))
        .route("/whisper", post(whisper_handler))
        .route("/upload_scroll", post(upload_scroll_handler))
        .route("/scrolls", get(scrolls_handler))
        .route("/reset_scrolls", post(reset_scrolls_handler))
        .route("/register", post(register_handler))
        .route("/inquiry/submit", post(inquiry_submit_handler))
        .route("/inquiry/history/:id", get(inquiry_history_handler))
        .route("/voice/process", post(voice_process_handler))
        .route("/voice/status", get(voice_status_handler))
        .route("/value/contribute", post(value_contribute_handler))
        .route("/value/transaction/:id", get(value_transaction_handler))
        .route("/value/status", get(value_status_handler))
        .nest_service("/audio", ServeDir::new(audio_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a pipeline failure to the generic error payload.
fn internal_error(e: OracleError) -> (StatusCode, Json<Value>) {
    tracing::error!("request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
}

// ---------------------------------------------------------------------------
// Oracle pipeline
// ---------------------------------------------------------------------------

/// Run one question through the full pipeline: dispatch, metering,
/// observations, transcript. Returns the answer text.
///
/// Metering and transcript failures degrade to warnings: once the provider
/// has answered, the answer is returned.
async fn answer_question(
    state: &AppState,
    question: &str,
    persona: &str,
    seeker_id: Option<String>,
    visitor_id: Option<String>,
) -> Result<String, OracleError> {
    let session_id = Uuid::new_v4().to_string();
    tracing::info!(persona, question_len = question.len(), "oracle question");

    let reply = state.dispatcher.respond(question, persona).await?;
    tracing::info!(answer_len = reply.answer.len(), source = %reply.source_model, "oracle answer");

    let estimated_tokens = ledger::estimate_tokens(question, &reply.answer);
    if let Err(e) = ledger::record_usage(&state.store, visitor_id.as_deref(), estimated_tokens) {
        tracing::warn!("visitor metering failed: {}", e);
    }
    let usage_class = UsageClass::classify(seeker_id.as_deref());

    let architect_observation = observer::architect_observation(
        question,
        persona,
        &session_id,
        state.settings.llama_enabled,
    );
    let corpus = scrolls::corpus(&state.store);
    let llama_observation = observer::affinity_observation(
        question,
        persona,
        &reply.answer,
        &corpus,
        state.settings.llama_enabled,
    );

    transcript::append(
        &state.store,
        InteractionEntry::new(InteractionParams {
            session_id,
            seeker_id,
            visitor_id,
            question: question.to_string(),
            oracle_used: persona.to_string(),
            answer: reply.answer.clone(),
            architect_observation,
            llama_observation,
            source_model: reply.source_model,
            estimated_tokens,
            usage_class,
        }),
    );

    Ok(reply.answer)
}

// ---------------------------------------------------------------------------
// Core handlers
// ---------------------------------------------------------------------------

/// GET / — welcome and endpoint index.
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Temple Oracle API",
        "version": crate::VERSION,
        "endpoints": {
            "health": "/health",
            "ask": "/ask",
            "whisper": "/whisper",
            "scrolls": "/scrolls",
            "register": "/register",
            "inquiry": "/inquiry/submit",
            "voice": "/voice/process",
            "value": "/value/contribute",
        }
    }))
}

/// GET /health — liveness probe with per-module availability.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let modules = &state.modules;
    let wisdom = if modules.wisdom.is_available() {
        "available"
    } else {
        "limited"
    };
    let voice = if modules.voice.is_available() {
        "available"
    } else {
        "unavailable"
    };
    Json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
        "modules": {
            "inquiry": "available",
            "wisdom": wisdom,
            "voice": voice,
            "value": "available",
        }
    }))
}

#[derive(Debug, Deserialize)]
struct QuestionInput {
    question: String,
    #[serde(default = "default_persona")]
    deity: String,
    seeker_id: Option<String>,
    visitor_id: Option<String>,
}

fn default_persona() -> String {
    "Hathor".to_string()
}

/// POST /ask — answer a question as the named persona.
async fn ask_handler(
    State(state): State<AppState>,
    Json(payload): Json<QuestionInput>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let answer = answer_question(
        &state,
        &payload.question,
        &payload.deity,
        payload.seeker_id.filter(|s| !s.is_empty()),
        payload.visitor_id.filter(|s| !s.is_empty()),
    )
    .await
    .map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "answer": answer })))
}

/// POST /whisper — voice question in, transcription + answer + speech out.
async fn whisper_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut audio_bytes: Option<Vec<u8>> = None;
    let mut voice = default_persona();
    let mut seeker_id: Option<String> = None;
    let mut visitor_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?;
                audio_bytes = Some(bytes.to_vec());
            }
            Some("voice") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?;
                if !text.is_empty() {
                    voice = text;
                }
            }
            Some("seeker_id") => seeker_id = non_empty_text(field).await,
            Some("visitor_id") => visitor_id = non_empty_text(field).await,
            _ => {}
        }
    }

    let audio_bytes = audio_bytes
        .ok_or_else(|| internal_error(OracleError::InvalidRequest("missing audio file".into())))?;

    // The temp file lives exactly as long as the transcription call.
    let question = {
        let tmp = write_temp_audio(&audio_bytes).map_err(internal_error)?;
        state
            .audio
            .transcribe(tmp.path())
            .await
            .map_err(internal_error)?
    };
    tracing::info!(transcription = %question, "whisper transcription");

    let answer = answer_question(&state, &question, &voice, seeker_id, visitor_id)
        .await
        .map_err(internal_error)?;

    let speech = state
        .audio
        .synthesize(&answer, oracle::speech_voice(&voice))
        .await
        .map_err(internal_error)?;

    let audio_dir = state.settings.audio_dir();
    let audio_id = Uuid::new_v4();
    let write_result = fs::create_dir_all(&audio_dir)
        .and_then(|_| fs::write(audio_dir.join(format!("{}.mp3", audio_id)), &speech));
    write_result.map_err(|e| internal_error(OracleError::Storage(e)))?;

    Ok(Json(serde_json::json!({
        "transcription": question,
        "answer": answer,
        "audio_url": format!("/audio/{}.mp3", audio_id),
    })))
}

fn write_temp_audio(bytes: &[u8]) -> Result<NamedTempFile, OracleError> {
    let mut tmp = NamedTempFile::with_suffix(".webm")?;
    tmp.write_all(bytes)?;
    Ok(tmp)
}

async fn non_empty_text(field: axum::extract::multipart::Field<'_>) -> Option<String> {
    field.text().await.ok().filter(|t| !t.is_empty())
}

/// POST /upload_scroll — ingest a document into the corpus.
async fn upload_scroll_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut seeker_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("scroll") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "scroll".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("seeker_id") => seeker_id = non_empty_text(field).await,
            _ => {}
        }
    }

    let (file_name, bytes) = file
        .ok_or_else(|| internal_error(OracleError::InvalidRequest("missing scroll file".into())))?;

    let scroll_id = scrolls::ingest(
        &state.store,
        &state.settings.upload_dir(),
        &file_name,
        &bytes,
        seeker_id.as_deref(),
    )
    .map_err(internal_error)?;

    Ok(Json(serde_json::json!({
        "message": "📜 Your scroll has been uploaded.",
        "scroll_id": scroll_id,
    })))
}

/// GET /scrolls — full corpus dump.
async fn scrolls_handler(State(state): State<AppState>) -> impl IntoResponse {
    let files = scrolls::corpus(&state.store);
    Json(serde_json::json!({
        "count": files.len(),
        "files": files,
    }))
}

/// POST /reset_scrolls — destructive corpus reset.
async fn reset_scrolls_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    scrolls::reset(&state.store, &state.settings.upload_dir())
        .map_err(|e| internal_error(OracleError::Storage(e)))?;
    Ok(Json(serde_json::json!({
        "message": "Scroll system reset successfully."
    })))
}

#[derive(Debug, Deserialize)]
struct RegisterInput {
    display_name: Option<String>,
}

/// POST /register — create a seeker identity.
async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let seeker_id = ledger::register_seeker(&state.store, payload.display_name)
        .map_err(|e| internal_error(OracleError::Storage(e)))?;
    Ok(Json(serde_json::json!({
        "seeker_id": seeker_id,
        "message": "Registration successful. Welcome to the temple.",
    })))
}

// ---------------------------------------------------------------------------
// Modular API handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct InquiryInput {
    question: String,
    #[serde(default)]
    inquiry_type: InquiryType,
    context: Option<String>,
    user_id: Option<String>,
}

/// POST /inquiry/submit — submit an inquiry, receive wisdom.
async fn inquiry_submit_handler(
    State(state): State<AppState>,
    Json(payload): Json<InquiryInput>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if !crate::modules::inquiry::InquiryModule::validate(&payload.question) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid inquiry: question cannot be empty"})),
        ));
    }

    let inquiry_id = state.modules.inquiry.submit(
        payload.question.clone(),
        payload.inquiry_type,
        payload.context.clone(),
        payload.user_id,
    );

    let wisdom = state
        .modules
        .wisdom
        .generate(
            &payload.question,
            payload.inquiry_type,
            payload.context.as_deref(),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "inquiry_id": inquiry_id,
            "question": payload.question,
            "wisdom": wisdom,
            "inquiry_type": payload.inquiry_type,
        })),
    ))
}

/// GET /inquiry/history/:id — fetch a submitted inquiry.
async fn inquiry_history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let inquiry = state.modules.inquiry.get(&id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Inquiry not found"})),
        )
    })?;
    Ok(Json(serde_json::to_value(inquiry).unwrap_or_default()))
}

/// POST /voice/process — optional audio in, transcription (or readiness) out.
async fn voice_process_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !state.modules.voice.is_available() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "Voice module is not available"})),
        ));
    }

    let mut audio: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?
    {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("audio_file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| internal_error(OracleError::InvalidRequest(e.to_string())))?;
            audio = Some(bytes.to_vec());
        }
    }

    let reply = state
        .modules
        .voice
        .process(audio.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::to_value(reply).unwrap_or_default()))
}

/// GET /voice/status — startup-computed capability flags.
async fn voice_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let caps = state.modules.voice.capabilities();
    Json(serde_json::json!({
        "available": state.modules.voice.is_available(),
        "tts_available": caps.tts_available,
        "stt_available": caps.stt_available,
    }))
}

#[derive(Debug, Deserialize)]
struct ContributionInput {
    amount: f64,
    #[serde(default = "default_currency")]
    currency: String,
    message: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// POST /value/contribute — record a contribution.
async fn value_contribute_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContributionInput>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if payload.amount <= 0.0 || payload.amount > 1_000_000.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Contribution amount out of range"})),
        ));
    }
    let tx = state
        .modules
        .value
        .contribute(payload.amount, payload.currency, payload.message);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "transaction_id": tx.id,
            "status": tx.status,
            "amount": tx.amount,
            "timestamp": tx.timestamp,
        })),
    ))
}

/// GET /value/transaction/:id — look up a contribution.
async fn value_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let tx = state.modules.value.get(&id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Transaction not found"})),
        )
    })?;
    Ok(Json(serde_json::to_value(tx).unwrap_or_default()))
}

/// GET /value/status — module availability and the payments switch.
async fn value_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "available": state.modules.value.is_available(),
        "payments_enabled": state.modules.value.payments_enabled(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
