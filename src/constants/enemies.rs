//! Ordinary actor archetype stats per size class.

pub const SMALL_HEALTH: f32 = 30.0;
pub const SMALL_RADIUS: f32 = 12.0;
pub const SMALL_SPEED: f32 = 120.0;
pub const SMALL_CONTACT_DAMAGE: f32 = 8.0;
pub const SMALL_XP: u32 = 3;

pub const MEDIUM_HEALTH: f32 = 90.0;
pub const MEDIUM_RADIUS: f32 = 18.0;
pub const MEDIUM_SPEED: f32 = 90.0;
pub const MEDIUM_CONTACT_DAMAGE: f32 = 14.0;
pub const MEDIUM_XP: u32 = 8;

pub const LARGE_HEALTH: f32 = 260.0;
pub const LARGE_RADIUS: f32 = 28.0;
pub const LARGE_SPEED: f32 = 60.0;
pub const LARGE_CONTACT_DAMAGE: f32 = 24.0;
pub const LARGE_XP: u32 = 20;

/// Separation shove applied when two actors overlap (fraction of overlap).
pub const SEPARATION_PUSH: f32 = 0.5;
