//! Axum route handlers for the Session API.
//!
//! Handlers lock the session for the whole action, LLM round-trips included,
//! so per-session actions are strictly sequential while distinct sessions
//! proceed independently.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::refinement::extract::{extract_entities, ExtractedEntities};
use crate::refinement::questions::generate_questions;
use crate::refinement::refine::generate_refined_description;
use crate::session::store::SharedSession;
use crate::session::{RefinementSession, SessionPhase};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub job_desc: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub index: usize,
    pub answer: String,
}

/// Uniform view of a session, returned after every action.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub created_at: DateTime<Utc>,
    pub job_desc: String,
    /// Extraction outcome: the model's JSON shape, or `{"error": ...}`.
    pub entities: Option<ExtractedEntities>,
    pub questions: Vec<String>,
    pub cursor: usize,
    /// Set while a question is awaiting an answer.
    pub current_question: Option<String>,
    pub refined: Option<String>,
}

impl SessionSnapshot {
    fn of(session: &RefinementSession) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            created_at: session.created_at(),
            job_desc: session.job_desc().to_string(),
            entities: session.entities().cloned(),
            questions: session.questions().to_vec(),
            cursor: session.cursor(),
            current_question: session.current_question().map(str::to_string),
            refined: session.refined().map(str::to_string),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Creates a fresh idle session.
pub async fn handle_create_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let handle = state.sessions.create().await;
    let active = state.sessions.count().await;
    let session = handle.lock().await;
    info!("Created session {} ({active} active)", session.id());
    Json(SessionSnapshot::of(&session))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = lookup_session(&state, session_id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionSnapshot::of(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        info!("Deleted session {session_id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {session_id} not found")))
    }
}

/// POST /api/v1/sessions/:id/extract
///
/// Runs entity extraction and question generation on the submitted job
/// description, then installs the fresh run in the session. Question
/// generation runs even when extraction produced the error form. Any
/// previous answers and refined output are discarded.
pub async fn handle_extract(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    if request.job_desc.trim().is_empty() {
        return Err(AppError::Validation("job_desc cannot be empty".to_string()));
    }

    let handle = lookup_session(&state, session_id).await?;
    let mut session = handle.lock().await;

    let entities = extract_entities(&request.job_desc, state.llm.as_ref()).await;
    let questions = generate_questions(&entities, state.llm.as_ref()).await;

    info!(
        "Extraction run installed for session {session_id}: {} questions",
        questions.len()
    );
    session.begin_run(request.job_desc, entities, questions);

    Ok(Json(SessionSnapshot::of(&session)))
}

/// POST /api/v1/sessions/:id/answers
///
/// Records the answer to the question at `index` and advances the cursor.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = lookup_session(&state, session_id).await?;
    let mut session = handle.lock().await;

    session.record_answer(request.index, request.answer)?;

    Ok(Json(SessionSnapshot::of(&session)))
}

/// POST /api/v1/sessions/:id/refine
///
/// Synthesizes the refined description once every question is answered.
/// Re-running after success replaces the previous refined output.
pub async fn handle_refine(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = lookup_session(&state, session_id).await?;
    let mut session = handle.lock().await;

    let inputs = session.refinement_inputs()?;
    let refined = generate_refined_description(
        &inputs.job_desc,
        &inputs.entities,
        &inputs.answers,
        state.llm.as_ref(),
    )
    .await;

    info!("Refined session {session_id}");
    session.record_refined(refined);

    Ok(Json(SessionSnapshot::of(&session)))
}

async fn lookup_session(state: &AppState, session_id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
