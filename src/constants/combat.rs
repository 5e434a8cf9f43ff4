//! Damage resolution, lifesteal, and knockback parameters.

/// Largest single damage amount accepted from external callers.
/// Anything above this is clamped before resolution.
pub const MAX_DAMAGE_PER_HIT: f32 = 100_000.0;

/// Fraction of incoming damage that survives crossing a live barrier line.
pub const BARRIER_MITIGATION: f32 = 0.25;

/// Damage multiplier while a shred (vulnerability) window is open.
pub const SHRED_VULNERABILITY_MULTIPLIER: f32 = 1.12;
/// Duration of the shred window in seconds, refreshed on reapplication.
pub const SHRED_DURATION: f32 = 3.0;

/// Lifesteal contribution of indirect (area/DoT) damage relative to direct hits.
pub const LIFESTEAL_INDIRECT_SHARE: f32 = 0.25;
/// Game time up to which lifesteal heals at full efficiency (seconds).
pub const HEAL_EFFICIENCY_FULL_UNTIL: f32 = 600.0;
/// Game time at which lifesteal efficiency reaches its floor (seconds).
pub const HEAL_EFFICIENCY_FLOOR_AT: f32 = 1800.0;
/// Lifesteal efficiency floor for late-run healing.
pub const HEAL_EFFICIENCY_FLOOR: f32 = 0.25;

/// Hard ceiling on knockback speed regardless of stacked hits (units/s).
pub const KNOCKBACK_MAX_SPEED: f32 = 900.0;
/// Fraction of the existing radial knockback component carried into a new hit.
pub const KNOCKBACK_CARRY: f32 = 0.5;
/// Exponential-ish decay rate applied to knockback velocity per second.
pub const KNOCKBACK_DECAY: f32 = 6.0;
/// Seconds of knockback timer granted per unit of impulse.
pub const KNOCKBACK_TIMER_PER_IMPULSE: f32 = 0.0008;
/// Longest a single knockback window may extend past the current frame.
pub const KNOCKBACK_TIMER_CAP: f32 = 0.45;
/// Actor radius at which the mass factor is exactly 1.0.
pub const KNOCKBACK_REFERENCE_RADIUS: f32 = 16.0;
/// Knockback resistance gained per elapsed run minute.
pub const KNOCKBACK_RESIST_PER_MINUTE: f32 = 0.04;
/// Additional flat knockback resistance for medium-class actors.
pub const KNOCKBACK_RESIST_MEDIUM: f32 = 0.35;
/// Additional flat knockback resistance for large-class actors.
pub const KNOCKBACK_RESIST_LARGE: f32 = 0.8;

/// Seconds between contact-damage hits from the same actor.
pub const CONTACT_HIT_INTERVAL: f32 = 0.6;

/// Burn seed magnitude gained per weapon level above the first.
pub const BURN_SEED_LEVEL_BONUS: f32 = 0.1;
