use axum::{extract::State, Json};
use redis::AsyncCommands;

use crate::{
    constants::{LEADERBOARD_CACHE_KEY, LEADERBOARD_CACHE_TTL_SECS, LEADERBOARD_LIMIT},
    error::{AppError, Result},
    models::{ApiResponse, LeaderboardEntry, SubmitScoreRequest},
    utils::{normalize_player_name, normalize_wallet_address},
};

use super::AppState;

/// GET /api/v1/leaderboard
///
/// Top 10 by score, ties broken by the faster run. Served from a short-TTL
/// cache; a cache failure falls through to the database with a warning.
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let mut redis = state.redis.clone();

    let cached: std::result::Result<Option<String>, redis::RedisError> =
        redis.get(LEADERBOARD_CACHE_KEY).await;
    match cached {
        Ok(Some(raw)) => {
            if let Ok(entries) = serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
                return Ok(Json(ApiResponse::success(entries)));
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Leaderboard cache read failed: {}", e),
    }

    let entries = state.db.top_scores(LEADERBOARD_LIMIT).await?;

    if let Ok(raw) = serde_json::to_string(&entries) {
        let written: std::result::Result<(), redis::RedisError> = redis
            .set_ex(LEADERBOARD_CACHE_KEY, raw, LEADERBOARD_CACHE_TTL_SECS)
            .await;
        if let Err(e) = written {
            tracing::warn!("Leaderboard cache write failed: {}", e);
        }
    }

    Ok(Json(ApiResponse::success(entries)))
}

/// POST /api/v1/leaderboard
pub async fn submit_score(
    State(state): State<AppState>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<Json<ApiResponse<LeaderboardEntry>>> {
    let player_name = normalize_player_name(&req.player_name)?;
    let wallet_address = normalize_wallet_address(req.wallet_address.as_deref())?;
    validate_score_fields(req.score, req.time_taken)?;

    let entry = state
        .db
        .insert_score(
            &player_name,
            wallet_address.as_deref(),
            req.score,
            req.time_taken,
        )
        .await?;

    let mut redis = state.redis.clone();
    let invalidated: std::result::Result<(), redis::RedisError> =
        redis.del(LEADERBOARD_CACHE_KEY).await;
    if let Err(e) = invalidated {
        tracing::warn!("Leaderboard cache invalidation failed: {}", e);
    }

    tracing::info!(
        "leaderboard_submit player={} score={} time_taken={}s",
        entry.player_name,
        entry.score,
        entry.time_taken
    );

    Ok(Json(ApiResponse::success(entry)))
}

fn validate_score_fields(score: i32, time_taken: i32) -> Result<()> {
    if score < 0 {
        return Err(AppError::BadRequest("score must be >= 0".to_string()));
    }
    if time_taken < 0 {
        return Err(AppError::BadRequest("time_taken must be >= 0".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_score_is_rejected() {
        assert!(validate_score_fields(-1, 30).is_err());
    }

    #[test]
    fn negative_time_is_rejected() {
        assert!(validate_score_fields(20, -1).is_err());
    }

    #[test]
    fn zero_values_are_accepted() {
        assert!(validate_score_fields(0, 0).is_ok());
    }
}
