//! Effect catalog and rarity scale.
//!
//! Static per-type configuration (base value, scaling, cap, stacking,
//! category) and per-tier rarity multipliers. Effect types form a closed
//! enum so every lookup here is infallible; only parsing raw text from the
//! external content pipeline can miss.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EffectsError;

/// Every effect an equipped collectible can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    HealthBoost,
    WeaponDamageBoost,
    MultipleProjectiles,
    MovementSpeed,
    FireRate,
    CriticalChance,
    ShieldStrength,
    BulletSpeed,
    BulletLifetime,
    MagneticRange,
    ExperienceBoost,
    MiningEfficiency,
}

impl EffectType {
    pub const ALL: [EffectType; 12] = [
        EffectType::HealthBoost,
        EffectType::WeaponDamageBoost,
        EffectType::MultipleProjectiles,
        EffectType::MovementSpeed,
        EffectType::FireRate,
        EffectType::CriticalChance,
        EffectType::ShieldStrength,
        EffectType::BulletSpeed,
        EffectType::BulletLifetime,
        EffectType::MagneticRange,
        EffectType::ExperienceBoost,
        EffectType::MiningEfficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HealthBoost => "health_boost",
            Self::WeaponDamageBoost => "weapon_damage_boost",
            Self::MultipleProjectiles => "multiple_projectiles",
            Self::MovementSpeed => "movement_speed",
            Self::FireRate => "fire_rate",
            Self::CriticalChance => "critical_chance",
            Self::ShieldStrength => "shield_strength",
            Self::BulletSpeed => "bullet_speed",
            Self::BulletLifetime => "bullet_lifetime",
            Self::MagneticRange => "magnetic_range",
            Self::ExperienceBoost => "experience_boost",
            Self::MiningEfficiency => "mining_efficiency",
        }
    }

    /// Human-readable label for summary UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HealthBoost => "Health Boost",
            Self::WeaponDamageBoost => "Weapon Damage",
            Self::MultipleProjectiles => "Projectiles",
            Self::MovementSpeed => "Movement Speed",
            Self::FireRate => "Fire Rate",
            Self::CriticalChance => "Critical Chance",
            Self::ShieldStrength => "Shield",
            Self::BulletSpeed => "Bullet Speed",
            Self::BulletLifetime => "Bullet Lifetime",
            Self::MagneticRange => "Magnetic Range",
            Self::ExperienceBoost => "Experience",
            Self::MiningEfficiency => "Mining Efficiency",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a type name coming from external item data.
    ///
    /// Accepts snake_case, camelCase, kebab-case and spaced names in any case:
    /// `"healthBoost"`, `"Health Boost"` and `"health-boost"` all resolve to
    /// [`EffectType::HealthBoost`].
    pub fn parse(raw: &str) -> Result<Self, EffectsError> {
        let key = normalize_key(raw);
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| EffectsError::UnknownEffectType(raw.to_string()))
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad grouping used by UI filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    Offensive,
    Defensive,
    Utility,
    Mobility,
    Special,
}

/// How an effect value is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectUnit {
    Percent,
    Flat,
    Count,
}

impl EffectUnit {
    /// Unknown unit text yields `None`; callers fall back to the catalog unit
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "%" | "percent" | "percentage" | "pct" => Some(Self::Percent),
            "flat" | "points" | "pts" | "hp" => Some(Self::Flat),
            "count" | "x" | "projectiles" | "number" => Some(Self::Count),
            _ => None,
        }
    }
}

/// Item quality grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl RarityTier {
    pub const ALL: [RarityTier; 4] = [
        RarityTier::Common,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Legendary,
    ];

    /// Effect strength multiplier for this tier
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Rare => 1.5,
            Self::Epic => 2.0,
            Self::Legendary => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, EffectsError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            _ => Err(EffectsError::UnknownRarityTier(raw.to_string())),
        }
    }
}

/// Static configuration for one effect type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Raw value used when a descriptor names the type but omits the amount
    pub base_value: f64,
    pub scaling_factor: f64,
    /// Per-item cap applied at extraction
    pub max_value: f64,
    pub stackable: bool,
    pub category: EffectCategory,
    pub unit: EffectUnit,
}

impl EffectConfig {
    const fn new(
        base_value: f64,
        scaling_factor: f64,
        max_value: f64,
        stackable: bool,
        category: EffectCategory,
        unit: EffectUnit,
    ) -> Self {
        Self {
            base_value,
            scaling_factor,
            max_value,
            stackable,
            category,
            unit,
        }
    }

    fn validate(&self, effect_type: EffectType) -> Result<(), EffectsError> {
        let fields = [
            ("base_value", self.base_value),
            ("scaling_factor", self.scaling_factor),
            ("max_value", self.max_value),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EffectsError::InvalidCatalogEntry {
                    effect_type: effect_type.to_string(),
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Built-in configuration table
fn default_config(effect_type: EffectType) -> EffectConfig {
    use EffectCategory::*;
    use EffectUnit::*;

    match effect_type {
        EffectType::HealthBoost => EffectConfig::new(10.0, 1.5, 100.0, true, Defensive, Percent),
        EffectType::WeaponDamageBoost => {
            EffectConfig::new(10.0, 1.5, 100.0, true, Offensive, Percent)
        }
        EffectType::MultipleProjectiles => EffectConfig::new(1.0, 1.0, 5.0, false, Offensive, Count),
        EffectType::MovementSpeed => EffectConfig::new(5.0, 1.2, 50.0, true, Mobility, Percent),
        EffectType::FireRate => EffectConfig::new(5.0, 1.2, 50.0, true, Offensive, Percent),
        EffectType::CriticalChance => EffectConfig::new(5.0, 1.0, 50.0, true, Offensive, Percent),
        EffectType::ShieldStrength => EffectConfig::new(20.0, 1.5, 200.0, true, Defensive, Flat),
        EffectType::BulletSpeed => EffectConfig::new(10.0, 1.2, 100.0, true, Offensive, Percent),
        EffectType::BulletLifetime => EffectConfig::new(10.0, 1.2, 100.0, true, Utility, Percent),
        EffectType::MagneticRange => EffectConfig::new(15.0, 1.3, 150.0, true, Utility, Percent),
        EffectType::ExperienceBoost => EffectConfig::new(10.0, 1.2, 100.0, true, Special, Percent),
        EffectType::MiningEfficiency => EffectConfig::new(10.0, 1.2, 100.0, true, Utility, Percent),
    }
}

/// Per-type effect configuration, indexed by [`EffectType`]
#[derive(Debug, Clone, PartialEq)]
pub struct EffectCatalog {
    entries: [EffectConfig; 12],
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self {
            entries: EffectType::ALL.map(default_config),
        }
    }
}

impl EffectCatalog {
    pub fn config(&self, effect_type: EffectType) -> &EffectConfig {
        &self.entries[effect_type.index()]
    }

    pub fn rarity_multiplier(&self, tier: RarityTier) -> f64 {
        tier.multiplier()
    }

    /// Multiplier for a raw tier label; unrecognized tiers scale by 1.0
    pub fn rarity_multiplier_for(&self, label: &str) -> f64 {
        match RarityTier::parse(label) {
            Ok(tier) => tier.multiplier(),
            Err(err) => {
                tracing::debug!(%err, "defaulting rarity multiplier to 1.0");
                1.0
            }
        }
    }

    /// Replace one entry after validating it
    pub fn with_override(
        mut self,
        effect_type: EffectType,
        config: EffectConfig,
    ) -> Result<Self, EffectsError> {
        config.validate(effect_type)?;
        self.entries[effect_type.index()] = config;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectType, &EffectConfig)> {
        EffectType::ALL.iter().map(move |t| (*t, self.config(*t)))
    }
}

/// Lowercase snake_case form of an identifier from external data
pub(crate) fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else if matches!(ch, '-' | ' ' | '_' | '.') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_multipliers() {
        assert_eq!(RarityTier::Common.multiplier(), 1.0);
        assert_eq!(RarityTier::Rare.multiplier(), 1.5);
        assert_eq!(RarityTier::Epic.multiplier(), 2.0);
        assert_eq!(RarityTier::Legendary.multiplier(), 3.0);
    }

    #[test]
    fn test_rarity_ordering() {
        for pair in RarityTier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].multiplier() < pair[1].multiplier());
        }
    }

    #[test]
    fn test_unknown_rarity_defaults_to_one() {
        let catalog = EffectCatalog::default();
        assert_eq!(catalog.rarity_multiplier_for("mythic"), 1.0);
        assert_eq!(catalog.rarity_multiplier_for(""), 1.0);
        assert_eq!(catalog.rarity_multiplier_for("LEGENDARY"), 3.0);
    }

    #[test]
    fn test_parse_effect_type_variants() {
        assert_eq!(EffectType::parse("health_boost").unwrap(), EffectType::HealthBoost);
        assert_eq!(EffectType::parse("healthBoost").unwrap(), EffectType::HealthBoost);
        assert_eq!(EffectType::parse("Health Boost").unwrap(), EffectType::HealthBoost);
        assert_eq!(
            EffectType::parse("weapon-damage-boost").unwrap(),
            EffectType::WeaponDamageBoost
        );
        assert_eq!(
            EffectType::parse("  MultipleProjectiles ").unwrap(),
            EffectType::MultipleProjectiles
        );
        assert!(matches!(
            EffectType::parse("laser_beam"),
            Err(EffectsError::UnknownEffectType(_))
        ));
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for t in EffectType::ALL {
            assert_eq!(EffectType::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn test_default_catalog_values() {
        let catalog = EffectCatalog::default();
        let health = catalog.config(EffectType::HealthBoost);
        assert_eq!(health.scaling_factor, 1.5);
        assert_eq!(health.max_value, 100.0);
        assert!(health.stackable);

        let projectiles = catalog.config(EffectType::MultipleProjectiles);
        assert!(!projectiles.stackable);
        assert_eq!(projectiles.max_value, 5.0);
        assert_eq!(projectiles.unit, EffectUnit::Count);
    }

    #[test]
    fn test_only_projectiles_are_non_stacking() {
        let catalog = EffectCatalog::default();
        let non_stacking: Vec<_> = catalog
            .iter()
            .filter(|(_, c)| !c.stackable)
            .map(|(t, _)| t)
            .collect();
        assert_eq!(non_stacking, vec![EffectType::MultipleProjectiles]);
    }

    #[test]
    fn test_override_replaces_entry() {
        let mut custom = *EffectCatalog::default().config(EffectType::CriticalChance);
        custom.max_value = 80.0;
        let catalog = EffectCatalog::default()
            .with_override(EffectType::CriticalChance, custom)
            .unwrap();
        assert_eq!(catalog.config(EffectType::CriticalChance).max_value, 80.0);
        assert_eq!(catalog.config(EffectType::HealthBoost).max_value, 100.0);
    }

    #[test]
    fn test_override_rejects_negative_cap() {
        let mut bad = *EffectCatalog::default().config(EffectType::FireRate);
        bad.max_value = -1.0;
        let result = EffectCatalog::default().with_override(EffectType::FireRate, bad);
        assert!(matches!(
            result,
            Err(EffectsError::InvalidCatalogEntry { .. })
        ));
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(EffectUnit::parse("%"), Some(EffectUnit::Percent));
        assert_eq!(EffectUnit::parse("Flat"), Some(EffectUnit::Flat));
        assert_eq!(EffectUnit::parse("x"), Some(EffectUnit::Count));
        assert_eq!(EffectUnit::parse("furlongs"), None);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("fireRate"), "fire_rate");
        assert_eq!(normalize_key("Bullet  Speed"), "bullet_speed");
        assert_eq!(normalize_key("HP"), "hp");
        assert_eq!(normalize_key("crit-chance_"), "crit_chance");
    }
}
