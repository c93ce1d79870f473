//! Error taxonomy for the effects engine.
//!
//! Most of these never escape the engine: extraction and equip paths log them
//! and degrade to "no bonus applied". Only config loading and whole-document
//! inventory parsing hand an `Err` back to the caller.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectsError {
    #[error("Malformed item {item_id}: {reason}")]
    MalformedItem { item_id: String, reason: String },

    #[error("Unknown effect type: {0}")]
    UnknownEffectType(String),

    #[error("Unknown rarity tier: {0}")]
    UnknownRarityTier(String),

    #[error("Invalid catalog entry for {effect_type}: {reason}")]
    InvalidCatalogEntry { effect_type: String, reason: String },

    #[error("Inventory parse error: {0}")]
    InventoryParse(String),
}

impl EffectsError {
    pub fn malformed(item_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedItem {
            item_id: item_id.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON config error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Catalog(#[from] EffectsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = EffectsError::malformed("42", "no effect data");
        assert_eq!(err.to_string(), "Malformed item 42: no effect data");
    }

    #[test]
    fn test_config_error_wraps_catalog() {
        let err: ConfigError = EffectsError::UnknownEffectType("laser".into()).into();
        assert_eq!(err.to_string(), "Unknown effect type: laser");
    }
}
