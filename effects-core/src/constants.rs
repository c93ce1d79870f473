//! Centralized constants for the effects engine.
//!
//! Per-type catalog values live in `catalog` as the single source of truth;
//! this file only holds the combination-table limits and base-stat defaults.

// =====================================================
// Aggregation limits
// =====================================================

/// Computed fire rate (shot interval) never drops below this
pub const FIRE_RATE_FLOOR: f64 = 100.0;

/// Aggregate critical chance cap (percent)
pub const CRITICAL_CHANCE_CAP: f64 = 100.0;

/// Projectile count never drops below one
pub const MIN_PROJECTILE_COUNT: u32 = 1;

/// Divisor turning a percent total into a fraction
pub const PERCENT: f64 = 100.0;

// =====================================================
// Stacking policy (informational per-effect metadata)
// =====================================================

pub const MAX_STACKS_PROJECTILES: u32 = 1;
pub const MAX_STACKS_CORE: u32 = 5;
pub const MAX_STACKS_DEFAULT: u32 = 3;

// =====================================================
// Base stats
// =====================================================

pub const BASE_HEALTH: f64 = 100.0;
pub const BASE_DAMAGE: f64 = 10.0;
pub const BASE_SPEED: f64 = 200.0;

/// Milliseconds between shots
pub const BASE_FIRE_RATE: f64 = 500.0;

pub const BASE_PROJECTILE_COUNT: u32 = 1;
pub const BASE_BULLET_SPEED: f64 = 400.0;

/// Milliseconds a bullet stays alive
pub const BASE_BULLET_LIFETIME: f64 = 2000.0;

pub const BASE_MAGNETIC_RANGE: f64 = 50.0;
pub const BASE_EXPERIENCE_MULTIPLIER: f64 = 1.0;
