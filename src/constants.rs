/// Application constants

// Game rules
pub const TARGET_SCORE: u32 = 20;
pub const GAME_DURATION_MS: u64 = 60_000;
pub const ENGINE_TICK_MS: u64 = 100;

// Spawn schedule: period shrinks with score, floored
pub const SPAWN_BASE_INTERVAL_MS: u64 = 1_000;
pub const SPAWN_ACCEL_PER_POINT_MS: u64 = 20;
pub const SPAWN_MIN_INTERVAL_MS: u64 = 300;
pub const MAX_ACTIVE_TARGETS: usize = 6;

// Target category weights (single weighted draw, remainder is normal)
pub const BONUS_PROBABILITY: f64 = 0.15;
pub const PENALTY_PROBABILITY: f64 = 0.10;

// Per-category scoring and lifetimes
pub const POINTS_NORMAL: u32 = 1;
pub const POINTS_BONUS: u32 = 3;
pub const PENALTY_DEDUCTION: u32 = 1;
pub const LIFETIME_NORMAL_MS: u64 = 3_000;
pub const LIFETIME_BONUS_MS: u64 = 2_000;
pub const LIFETIME_PENALTY_MS: u64 = 5_000;

// Combo system
pub const COMBO_BONUS_THRESHOLD: u32 = 3;
pub const COMBO_IDLE_WINDOW_MS: u64 = 1_000;

// Logical play field (clients scale to their viewport)
pub const FIELD_WIDTH: f64 = 960.0;
pub const FIELD_HEIGHT: f64 = 540.0;
pub const TARGET_SIZE: f64 = 60.0;
pub const FIELD_MARGIN: f64 = 20.0;

// Session registry
pub const ENDED_SESSION_TTL_SECS: i64 = 600;
pub const REGISTRY_SWEEP_EVERY_TICKS: u64 = 100;

// Leaderboard
pub const LEADERBOARD_LIMIT: i64 = 10;
pub const LEADERBOARD_CACHE_KEY: &str = "leaderboard:top";
pub const LEADERBOARD_CACHE_TTL_SECS: u64 = 15;
pub const MAX_PLAYER_NAME_LEN: usize = 50;

// Monad Testnet
pub const MONAD_TESTNET_CHAIN_ID: u64 = 10143;
pub const MONAD_TESTNET_CHAIN_NAME: &str = "Monad Testnet";
pub const MONAD_TESTNET_RPC_URL: &str = "https://testnet-rpc.monad.xyz";
pub const MONAD_TESTNET_EXPLORER: &str = "https://testnet.monadexplorer.com";

// Victory NFT
pub const NFT_NAME_PREFIX: &str = "ScoreQuest Victory";
pub const NFT_GAME_TRAIT: &str = "ScoreQuest NFT";
pub const RARITY_LEGENDARY_SCORE: u32 = 25;
pub const RARITY_EPIC_SCORE: u32 = 22;

// WebSocket stream
pub const WS_SNAPSHOT_INTERVAL_MS: u64 = 250;

// API version
pub const API_VERSION: &str = "v1";
