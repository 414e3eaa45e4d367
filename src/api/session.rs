use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    game::{HitOutcome, SessionSnapshot},
    models::ApiResponse,
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: u64,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct HitRequest {
    pub target_id: u64,
}

#[derive(Debug, Serialize)]
pub struct HitResponse {
    pub hit: HitOutcome,
    pub snapshot: SessionSnapshot,
}

/// POST /api/v1/session/start
pub async fn start_session(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StartSessionResponse>>> {
    let (session_id, snapshot) = state.sessions.create().await;
    tracing::info!("session_started session={}", session_id);

    Ok(Json(ApiResponse::success(StartSessionResponse {
        session_id,
        snapshot,
    })))
}

/// GET /api/v1/session/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let snapshot = state
        .sessions
        .snapshot(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Unknown session {session_id}")))?;

    Ok(Json(ApiResponse::success(snapshot)))
}

/// POST /api/v1/session/{session_id}/hit
///
/// A click racing an expiry comes back as `ignored` with the live snapshot;
/// only an unknown session id is an error.
pub async fn hit_target(
    State(state): State<AppState>,
    Path(session_id): Path<u64>,
    Json(req): Json<HitRequest>,
) -> Result<Json<ApiResponse<HitResponse>>> {
    let (hit, snapshot) = state.sessions.hit(session_id, req.target_id).await?;

    if matches!(hit, HitOutcome::Scored { .. }) {
        if let Some(outcome) = snapshot.outcome {
            tracing::info!(
                "session_won session={} score={} time_taken={}s",
                session_id,
                outcome.score,
                outcome.time_taken_secs
            );
        }
    }

    Ok(Json(ApiResponse::success(HitResponse { hit, snapshot })))
}
