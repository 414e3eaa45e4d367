use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== LEADERBOARD ====================
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub player_name: String,
    pub wallet_address: Option<String>,
    pub score: i32,
    pub time_taken: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub player_name: String,
    pub wallet_address: Option<String>,
    pub score: i32,
    pub time_taken: i32,
}
