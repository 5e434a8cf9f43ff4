//! Elite behavior tuning: phase timings, attack geometry, caps.

/// Health multiplier applied on top of the size-class base for elites.
pub const ELITE_HEALTH_MULTIPLIER: f32 = 6.0;
/// Experience multiplier for elite kills.
pub const ELITE_XP_MULTIPLIER: u32 = 10;

/// Range within which an idle elite will start telegraphing.
pub const ELITE_ENGAGE_RANGE: f32 = 640.0;
/// Deferral step applied when a phase boundary lands while hidden by fog.
pub const ELITE_FOG_DEFER: f32 = 0.25;

/// Per-kind concurrent cap during the tight window after elites unlock.
pub const ELITE_KIND_CAP_EARLY: usize = 1;
/// Per-kind concurrent cap after the tight window has passed.
pub const ELITE_KIND_CAP_LATE: usize = 2;
/// Seconds after unlock during which the early per-kind cap applies.
pub const ELITE_CAP_TIGHT_WINDOW: f32 = 300.0;
/// Global cap on concurrent elites.
pub const ELITE_GLOBAL_CAP: usize = 8;
/// Per-kind cooldown after an elite of that kind dies.
pub const ELITE_RESPAWN_COOLDOWN: f32 = 12.0;

// Rusher: dash melee with a suppression window so incoming knockback
// cannot instantly cancel the dash.
pub const RUSHER_WINDUP: f32 = 0.7;
pub const RUSHER_ACTION_HOLD: f32 = 0.45;
pub const RUSHER_RECOVER: f32 = 0.6;
pub const RUSHER_COOLDOWN: f32 = 4.0;
pub const RUSHER_DASH_SPEED: f32 = 520.0;
pub const RUSHER_SUPPRESS_WINDOW: f32 = 0.7;
pub const RUSHER_HIT_DAMAGE: f32 = 22.0;

// Marksman: aim snapshot at windup, slow dodgeable projectile.
pub const MARKSMAN_WINDUP: f32 = 0.9;
pub const MARKSMAN_ACTION_HOLD: f32 = 0.2;
pub const MARKSMAN_RECOVER: f32 = 0.5;
pub const MARKSMAN_COOLDOWN: f32 = 3.5;
pub const MARKSMAN_SHOT_SPEED: f32 = 260.0;
pub const MARKSMAN_SHOT_DAMAGE: f32 = 16.0;
pub const MARKSMAN_SHOT_LIFETIME: f32 = 4.0;
pub const MARKSMAN_BLAST_RADIUS: f32 = 48.0;

// Warden: slow-only field pulse, never damages.
pub const WARDEN_WINDUP: f32 = 0.6;
pub const WARDEN_ACTION_HOLD: f32 = 0.3;
pub const WARDEN_RECOVER: f32 = 0.4;
pub const WARDEN_COOLDOWN: f32 = 5.0;
pub const WARDEN_FIELD_RADIUS: f32 = 140.0;
pub const WARDEN_FIELD_SLOW: f32 = 0.45;
pub const WARDEN_FIELD_DURATION: f32 = 3.5;

// Bomber: arcing slow bomb exploding on impact or expiry.
pub const BOMBER_WINDUP: f32 = 0.8;
pub const BOMBER_ACTION_HOLD: f32 = 0.3;
pub const BOMBER_RECOVER: f32 = 0.7;
pub const BOMBER_COOLDOWN: f32 = 4.5;
pub const BOMBER_SHOT_SPEED: f32 = 180.0;
pub const BOMBER_SHOT_DAMAGE: f32 = 26.0;
pub const BOMBER_BLAST_RADIUS: f32 = 90.0;
pub const BOMBER_MAX_FLIGHT: f32 = 2.2;

// Blinker: teleport onto a ring around the target, slash, sometimes a
// follow-up shot.
pub const BLINKER_WINDUP: f32 = 0.5;
pub const BLINKER_ACTION_HOLD: f32 = 0.25;
pub const BLINKER_RECOVER: f32 = 0.8;
pub const BLINKER_COOLDOWN: f32 = 5.5;
pub const BLINKER_RING_RADIUS: f32 = 90.0;
pub const BLINKER_SLASH_RANGE: f32 = 120.0;
pub const BLINKER_SLASH_DAMAGE: f32 = 18.0;
pub const BLINKER_FOLLOWUP_CHANCE: f64 = 0.3;
pub const BLINKER_FOLLOWUP_SPEED: f32 = 300.0;
pub const BLINKER_FOLLOWUP_DAMAGE: f32 = 8.0;
pub const BLINKER_FOLLOWUP_LIFETIME: f32 = 2.0;

// Bulwark: temporary line barrier that mitigates damage crossing it.
pub const BULWARK_WINDUP: f32 = 0.6;
pub const BULWARK_ACTION_HOLD: f32 = 0.3;
pub const BULWARK_RECOVER: f32 = 0.5;
pub const BULWARK_COOLDOWN: f32 = 9.0;
pub const BULWARK_BARRIER_HALF_LENGTH: f32 = 110.0;
pub const BULWARK_BARRIER_DURATION: f32 = 6.0;
pub const BULWARK_BARRIER_OFFSET: f32 = 40.0;

// Lancer: long telegraphed aim line locked at windup start, then a short
// continuous beam along that line.
pub const LANCER_WINDUP: f32 = 1.3;
pub const LANCER_BEAM_DURATION: f32 = 1.0;
pub const LANCER_RECOVER: f32 = 0.8;
pub const LANCER_COOLDOWN: f32 = 6.0;
pub const LANCER_BEAM_LENGTH: f32 = 560.0;
pub const LANCER_BEAM_WIDTH: f32 = 26.0;
pub const LANCER_BEAM_DPS: f32 = 45.0;
