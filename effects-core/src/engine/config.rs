use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::aggregator::BaseStats;
use crate::catalog::{EffectCatalog, EffectConfig, EffectType};
use crate::constants::{FIRE_RATE_FLOOR, MIN_PROJECTILE_COUNT};
use crate::error::{ConfigError, EffectsError};
use crate::logging::TracingConfig;

/// Engine configuration, loadable from `.json` or `.ron`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_stats: BaseStats,
    /// Full replacement entries for individual effect types
    pub catalog_overrides: BTreeMap<EffectType, EffectConfig>,
    pub tracing: TracingConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let read = || {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let config = match extension.as_str() {
            "json" => Self::from_json(&read()?)?,
            "ron" => Self::from_ron(&read()?)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::info!(path = %path.display(), overrides = config.catalog_overrides.len(), "config loaded");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.base_stats;
        let fields = [
            ("health", base.health),
            ("damage", base.damage),
            ("speed", base.speed),
            ("fire_rate", base.fire_rate),
            ("bullet_speed", base.bullet_speed),
            ("bullet_lifetime", base.bullet_lifetime),
            ("magnetic_range", base.magnetic_range),
            ("experience_multiplier", base.experience_multiplier),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "base_stats.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if base.health <= 0.0 {
            return Err(ConfigError::Invalid("base_stats.health must be positive".into()));
        }
        if base.fire_rate < FIRE_RATE_FLOOR {
            return Err(ConfigError::Invalid(format!(
                "base_stats.fire_rate must be at least {FIRE_RATE_FLOOR}, got {}",
                base.fire_rate
            )));
        }
        if base.projectile_count < MIN_PROJECTILE_COUNT {
            return Err(ConfigError::Invalid(
                "base_stats.projectile_count must be at least 1".into(),
            ));
        }

        self.build_catalog()?;
        Ok(())
    }

    /// Default catalog with this config's overrides applied
    pub fn build_catalog(&self) -> Result<EffectCatalog, EffectsError> {
        self.catalog_overrides
            .iter()
            .try_fold(EffectCatalog::default(), |catalog, (effect_type, config)| {
                catalog.with_override(*effect_type, *config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EffectCategory, EffectUnit};
    use crate::logging::LogLevel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_catalog().unwrap(), EffectCatalog::default());
    }

    #[test]
    fn test_from_json_with_override() {
        let json = r#"{
            "base_stats": {"health": 150.0},
            "catalog_overrides": {
                "critical_chance": {
                    "base_value": 5.0,
                    "scaling_factor": 2.0,
                    "max_value": 75.0,
                    "stackable": true,
                    "category": "offensive",
                    "unit": "percent"
                }
            }
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.base_stats.health, 150.0);
        assert_eq!(config.base_stats.damage, BaseStats::default().damage);

        let catalog = config.build_catalog().unwrap();
        let crit = catalog.config(EffectType::CriticalChance);
        assert_eq!(crit.scaling_factor, 2.0);
        assert_eq!(crit.max_value, 75.0);
        assert_eq!(crit.category, EffectCategory::Offensive);
        assert_eq!(crit.unit, EffectUnit::Percent);
    }

    #[test]
    fn test_rejects_fire_rate_below_floor() {
        let result = EngineConfig::from_json(r#"{"base_stats": {"fire_rate": 50.0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_projectiles() {
        let result = EngineConfig::from_json(r#"{"base_stats": {"projectile_count": 0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_override() {
        let json = r#"{"catalog_overrides": {"fire_rate": {
            "base_value": 5.0, "scaling_factor": -1.0, "max_value": 50.0,
            "stackable": true, "category": "offensive", "unit": "percent"
        }}}"#;
        let result = EngineConfig::from_json(json);
        assert!(matches!(result, Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_load_json_file() {
        let mut temp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(temp, r#"{{"base_stats": {{"damage": 25.0}}}}"#).unwrap();
        let config = EngineConfig::load(temp.path()).unwrap();
        assert_eq!(config.base_stats.damage, 25.0);
    }

    #[test]
    fn test_load_ron_file() {
        let mut temp = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        writeln!(
            temp,
            "(base_stats: (speed: 300.0), tracing: (default_level: debug))"
        )
        .unwrap();
        let config = EngineConfig::load(temp.path()).unwrap();
        assert_eq!(config.base_stats.speed, 300.0);
        assert_eq!(config.tracing.default_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let temp = NamedTempFile::new().unwrap();
        assert!(matches!(
            EngineConfig::load(temp.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            EngineConfig::load("does/not/exist.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json("{broken"),
            Err(ConfigError::Json(_))
        ));
    }
}
