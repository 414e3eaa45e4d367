// Utility modules

use crate::{
    constants::MAX_PLAYER_NAME_LEN,
    error::{AppError, Result},
};

/// Trims and bounds a submitted player name.
pub fn normalize_player_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("player_name is required".to_string()));
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "player_name exceeds maximum length ({MAX_PLAYER_NAME_LEN})"
        )));
    }
    Ok(name.to_string())
}

/// Optional wallet address; when present it must be 0x-prefixed 20-byte hex.
pub fn normalize_wallet_address(raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) else {
        return Err(AppError::BadRequest(
            "wallet_address must start with 0x".to_string(),
        ));
    };
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(
            "wallet_address must be a 40-digit hex address".to_string(),
        ));
    }
    Ok(Some(format!("0x{}", hex.to_ascii_lowercase())))
}
