//! Axum route handlers for the page session API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::page::session::{AnimationView, ComplimentView, PageView, Region, SlotName, SlotView};
use crate::page::PageSession;
use crate::poem::{layout, RenderedPoem};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub page: PageView,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// False when a compliment was already being generated.
    pub accepted: bool,
    pub compliment: ComplimentView,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub wait_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityReport {
    /// Fraction of the region currently in view, 0.0 – 1.0.
    pub ratio: f32,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Mounts a new page: the image request goes out and the petals start falling.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session = state.pages.mount();
    state.sessions.insert(Arc::clone(&session)).await;
    let active_sessions = state.sessions.len().await;
    debug!(active_sessions, "Session registered");

    let page = session.view().await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id(),
            page,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PageView>, AppError> {
    let session = find_session(&state, session_id).await?;
    Ok(Json(session.view().await))
}

/// DELETE /api/v1/sessions/:id
///
/// Unmounts the page. In-flight fetches finish on their own and are discarded.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}

/// POST /api/v1/sessions/:id/compliment/refresh
pub async fn handle_refresh_compliment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RefreshResponse>), AppError> {
    let session = find_session(&state, session_id).await?;
    let accepted = session.request_compliment();

    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            accepted,
            compliment: session.compliment_view(),
        }),
    ))
}

/// GET /api/v1/sessions/:id/slots/:slot?wait_ms=N
///
/// With `wait_ms`, long-polls until the slot is no longer loading, capped by
/// `SESSION_WAIT_MAX_MS`. On timeout the current (loading) state is returned.
pub async fn handle_get_slot(
    State(state): State<AppState>,
    Path((session_id, slot)): Path<(Uuid, String)>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotView>, AppError> {
    let name: SlotName = slot.parse()?;
    let session = find_session(&state, session_id).await?;

    let view = match query.wait_ms {
        Some(wait_ms) if wait_ms > 0 => {
            let wait = Duration::from_millis(wait_ms.min(state.config.session_wait_max_ms));
            tokio::time::timeout(wait, session.settled_slot_view(name))
                .await
                .unwrap_or_else(|_| session.slot_view(name))
        }
        _ => session.slot_view(name),
    };

    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/regions/:region/visibility
pub async fn handle_report_visibility(
    State(state): State<AppState>,
    Path((session_id, region)): Path<(Uuid, String)>,
    Json(report): Json<VisibilityReport>,
) -> Result<Json<AnimationView>, AppError> {
    let region: Region = region.parse()?;
    if !report.ratio.is_finite() || !(0.0..=1.0).contains(&report.ratio) {
        return Err(AppError::Validation(
            "ratio must be between 0.0 and 1.0".to_string(),
        ));
    }

    let session = find_session(&state, session_id).await?;
    Ok(Json(session.report_visibility(region, report.ratio).await))
}

/// POST /api/v1/poem/layout
///
/// Stateless acrostic layout of arbitrary poem text.
pub async fn handle_layout_poem(Json(request): Json<LayoutRequest>) -> Json<RenderedPoem> {
    Json(layout(&request.text))
}

async fn find_session(state: &AppState, session_id: Uuid) -> Result<Arc<PageSession>, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {session_id} not found"))
}
