use serde::Deserialize;
use std::env;

use crate::constants::{MONAD_TESTNET_CHAIN_ID, MONAD_TESTNET_RPC_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,

    // Blockchain
    pub monad_rpc_url: String,
    pub monad_chain_id: u64,
    pub nft_contract_address: String,

    // Relayer signing key for mintNFT; minting is disabled when absent
    pub minter_private_key: Option<String>,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            monad_rpc_url: env::var("MONAD_RPC_URL")
                .unwrap_or_else(|_| MONAD_TESTNET_RPC_URL.to_string()),
            monad_chain_id: env::var("MONAD_CHAIN_ID")
                .unwrap_or_else(|_| MONAD_TESTNET_CHAIN_ID.to_string())
                .parse()?,
            nft_contract_address: env::var("NFT_CONTRACT_ADDRESS")?,

            minter_private_key: env::var("MINTER_PRIVATE_KEY").ok(),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if url::Url::parse(&self.monad_rpc_url).is_err() {
            anyhow::bail!("MONAD_RPC_URL is not a valid URL: {}", self.monad_rpc_url);
        }
        if self.monad_chain_id == 0 {
            anyhow::bail!("MONAD_CHAIN_ID must be non-zero");
        }

        if self.nft_contract_address.starts_with("0x0000") {
            tracing::warn!("Using placeholder NFT contract address");
        }
        if self.minter_private_key.is_none() {
            tracing::warn!("MINTER_PRIVATE_KEY not set; /nft/mint will be disabled");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        if self.environment == "development" || self.environment == "testnet" {
            return true;
        }
        self.monad_chain_id == MONAD_TESTNET_CHAIN_ID
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "0.0.0.0".to_string(),
        port: 3000,
        environment: "development".to_string(),
        database_url: "postgres://localhost/scorequest".to_string(),
        database_max_connections: 1,
        redis_url: "redis://localhost:6379".to_string(),
        monad_rpc_url: MONAD_TESTNET_RPC_URL.to_string(),
        monad_chain_id: MONAD_TESTNET_CHAIN_ID,
        nft_contract_address: "0x16FAb074954D2eE5A5Dbc4Be8781638612C57250".to_string(),
        minter_private_key: None,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_detected_from_chain_id() {
        let mut config = test_config();
        config.environment = "production".to_string();
        assert!(config.is_testnet());

        config.monad_chain_id = 1;
        assert!(!config.is_testnet());
    }

    #[test]
    fn validate_rejects_bad_rpc_url() {
        let mut config = test_config();
        config.monad_rpc_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }
}
