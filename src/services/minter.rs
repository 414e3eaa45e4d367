use std::sync::Arc;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use ethers::{
    contract::abigen,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::Address,
};

use crate::{
    config::Config,
    constants::{
        MONAD_TESTNET_CHAIN_NAME, MONAD_TESTNET_EXPLORER, NFT_GAME_TRAIT, NFT_NAME_PREFIX,
        RARITY_EPIC_SCORE, RARITY_LEGENDARY_SCORE,
    },
    error::{AppError, Result},
};

abigen!(
    ScoreQuestNft,
    r#"[
        function mintNFT(address to, string tokenURI)
    ]"#
);

/// Relayer for the victory NFT contract. Built per call from config, like
/// the RPC readers elsewhere; holding no connection keeps teardown trivial.
pub struct Minter {
    rpc_url: String,
    chain_id: u64,
    contract_address: Address,
    signer_key: String,
}

impl Minter {
    pub fn from_config(config: &Config) -> Result<Self> {
        let signer_key = config
            .minter_private_key
            .clone()
            .ok_or(AppError::SignerNotConfigured)?;
        let contract_address = config
            .nft_contract_address
            .parse::<Address>()
            .map_err(|_| {
                AppError::Internal(format!(
                    "Invalid NFT contract address: {}",
                    config.nft_contract_address
                ))
            })?;

        Ok(Self {
            rpc_url: config.monad_rpc_url.clone(),
            chain_id: config.monad_chain_id,
            contract_address,
            signer_key,
        })
    }

    /// Submit `mintNFT(to, tokenURI)` and wait for the receipt. The chain id
    /// reported by the RPC must match the configured network before anything
    /// is signed.
    pub async fn mint(&self, to: Address, token_uri: String) -> Result<String> {
        let provider = Provider::<Http>::try_from(self.rpc_url.as_str())
            .map_err(|e| AppError::BlockchainRPC(format!("Invalid RPC endpoint: {e}")))?;

        let reported = provider
            .get_chainid()
            .await
            .map_err(|e| AppError::BlockchainRPC(e.to_string()))?
            .as_u64();
        if reported != self.chain_id {
            return Err(AppError::WrongNetwork {
                expected: self.chain_id,
                actual: reported,
            });
        }

        let wallet = self
            .signer_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|_| AppError::SignerNotConfigured)?
            .with_chain_id(self.chain_id);
        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = ScoreQuestNft::new(self.contract_address, client);

        let call = contract.mint_nft(to, token_uri);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_rpc_error(&e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| classify_rpc_error(&e.to_string()))?
            .ok_or_else(|| {
                AppError::BlockchainRPC("Transaction dropped from the mempool".to_string())
            })?;

        if receipt.status.map(|status| status.as_u64()) == Some(0) {
            return Err(AppError::TransactionRejected(
                "mintNFT reverted on-chain".to_string(),
            ));
        }

        Ok(format!("{:#x}", receipt.transaction_hash))
    }
}

fn classify_rpc_error(message: &str) -> AppError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("insufficient funds") {
        AppError::InsufficientFunds
    } else if lower.contains("revert") || lower.contains("rejected") || lower.contains("denied") {
        AppError::TransactionRejected(message.to_string())
    } else {
        AppError::BlockchainRPC(message.to_string())
    }
}

// ==================== VICTORY METADATA ====================

pub fn rarity_for_score(score: u32) -> &'static str {
    if score >= RARITY_LEGENDARY_SCORE {
        "Legendary"
    } else if score >= RARITY_EPIC_SCORE {
        "Epic"
    } else {
        "Rare"
    }
}

pub fn victory_metadata(score: u32, minted_at: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "name": format!("{} #{}", NFT_NAME_PREFIX, minted_at.timestamp()),
        "description": format!(
            "A victory NFT earned by reaching {score} points in ScoreQuest on {MONAD_TESTNET_CHAIN_NAME}"
        ),
        "attributes": [
            { "trait_type": "Score", "value": score },
            { "trait_type": "Game", "value": NFT_GAME_TRAIT },
            { "trait_type": "Network", "value": MONAD_TESTNET_CHAIN_NAME },
            { "trait_type": "Completion Date", "value": minted_at.format("%Y-%m-%d").to_string() },
            { "trait_type": "Rarity", "value": rarity_for_score(score) },
        ],
    })
}

/// Metadata travels inline as a base64 `data:` URI; nothing is pinned.
pub fn token_uri(metadata: &serde_json::Value) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(metadata.to_string());
    format!("data:application/json;base64,{encoded}")
}

pub fn explorer_tx_url(tx_hash: &str) -> String {
    format!("{MONAD_TESTNET_EXPLORER}/tx/{tx_hash}")
}
