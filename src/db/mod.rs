use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{config::Config, error::Result, models::LeaderboardEntry};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== LEADERBOARD QUERIES ====================
impl Database {
    /// Top entries ordered by score, ties broken by the faster time.
    pub async fn top_scores(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT id, player_name, wallet_address, score, time_taken, created_at
             FROM leaderboard
             ORDER BY score DESC, time_taken ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn insert_score(
        &self,
        player_name: &str,
        wallet_address: Option<&str>,
        score: i32,
        time_taken: i32,
    ) -> Result<LeaderboardEntry> {
        let entry = sqlx::query_as::<_, LeaderboardEntry>(
            "INSERT INTO leaderboard (player_name, wallet_address, score, time_taken)
             VALUES ($1, $2, $3, $4)
             RETURNING id, player_name, wallet_address, score, time_taken, created_at",
        )
        .bind(player_name)
        .bind(wallet_address)
        .bind(score)
        .bind(time_taken)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[tokio::test]
    async fn database_new_returns_error_on_invalid_url() {
        let mut config = test_config();
        config.database_url = "not-a-url".to_string();
        let result = Database::new(&config).await;
        assert!(result.is_err());
    }
}
