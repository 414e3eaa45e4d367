// Re-export API endpoint modules
pub mod health;
pub mod leaderboard;
pub mod nft;
pub mod session;

// AppState definition
use crate::config::Config;
use crate::db::Database;
use crate::services::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub redis: redis::aio::ConnectionManager,
    pub config: Config,
    pub sessions: SessionRegistry,
}
