use axum::{extract::State, Json};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::TARGET_SCORE,
    error::{AppError, Result},
    models::ApiResponse,
    services::minter::{explorer_tx_url, token_uri, victory_metadata},
    services::Minter,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub session_id: u64,
    pub to_address: String,
}

#[derive(Debug, Serialize)]
pub struct MintResponse {
    pub tx_hash: String,
    pub explorer_url: String,
    pub metadata: serde_json::Value,
}

/// POST /api/v1/nft/mint
///
/// Mints the victory NFT for a finished, won session. The session must still
/// be in the registry (ended sessions are retained for a grace window).
pub async fn mint_nft(
    State(state): State<AppState>,
    Json(req): Json<MintRequest>,
) -> Result<Json<ApiResponse<MintResponse>>> {
    let snapshot = state
        .sessions
        .snapshot(req.session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Unknown session {}", req.session_id)))?;

    let outcome = snapshot.outcome.ok_or_else(|| {
        AppError::BadRequest("Session has not finished yet".to_string())
    })?;
    if !outcome.won {
        return Err(AppError::BadRequest(format!(
            "Session did not reach the winning score ({TARGET_SCORE})"
        )));
    }

    let to = req.to_address.parse::<Address>().map_err(|_| {
        AppError::BadRequest("to_address must be a 0x-prefixed EVM address".to_string())
    })?;

    let minter = Minter::from_config(&state.config)?;
    let metadata = victory_metadata(outcome.score, chrono::Utc::now());
    let tx_hash = minter.mint(to, token_uri(&metadata)).await?;

    tracing::info!(
        "nft_minted session={} score={} to={} tx={}",
        req.session_id,
        outcome.score,
        req.to_address,
        tx_hash
    );

    Ok(Json(ApiResponse::success(MintResponse {
        explorer_url: explorer_tx_url(&tx_hash),
        tx_hash,
        metadata,
    })))
}
