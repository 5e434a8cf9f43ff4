//! Components attached to simulated actors, plus the small plain structs
//! shared across systems (player mirror, boss state).
//!
//! Every spawn path constructs these fresh, so a recycled hecs slot can
//! never leak status effects, elite state, or knockback into a new actor.

use glam::Vec2;

use crate::constants::*;

/// World position in arena units.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Marker for hostile actors owned by the simulation.
#[derive(Debug, Clone, Copy)]
pub struct Hostile;

/// Coarse actor size class; drives stats, spawn cost, and knockback mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

/// Health pool. `current` never exceeds `max`.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Static body parameters set at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub radius: f32,
    pub size: SizeClass,
    pub base_speed: f32,
    pub contact_damage: f32,
    pub xp_reward: u32,
}

/// Transient physical displacement from hits, decaying over time.
///
/// `until` and `suppressed_until` are absolute timestamps compared against
/// the frame-cached now; no per-frame countdown fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Knockback {
    pub velocity: Vec2,
    pub until: f32,
    pub suppressed_until: f32,
}

impl Knockback {
    pub fn is_active(&self, now: f32) -> bool {
        self.until > now && self.velocity.length_squared() > 1e-6
    }

    pub fn is_suppressed(&self, now: f32) -> bool {
        self.suppressed_until > now
    }
}

/// Per-actor cooldown for contact damage against the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactAttack {
    pub next_hit_at: f32,
}

/// A single stacking damage-over-time record.
#[derive(Debug, Clone, Copy)]
pub struct DotRecord {
    pub stacks: u32,
    pub expires_at: f32,
    pub next_tick_at: f32,
    /// Per-stack damage magnitude captured at seed time.
    pub per_stack: f32,
}

/// All timed effects attached to one actor. Each kind is an independent
/// record with its own cadence; see `systems::effects`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusEffects {
    pub poison: Option<DotRecord>,
    pub burn: Option<DotRecord>,
    pub mark: Option<DotRecord>,
    pub paralyzed_until: f32,
    pub dominated_until: f32,
    pub domination_next_pulse_at: f32,
    pub shred_until: f32,
}

impl StatusEffects {
    pub fn is_paralyzed(&self, now: f32) -> bool {
        self.paralyzed_until > now
    }

    pub fn is_dominated(&self, now: f32) -> bool {
        self.dominated_until > now
    }

    pub fn is_shredded(&self, now: f32) -> bool {
        self.shred_until > now
    }
}

/// Distinguished elite actor kinds, each with a bespoke telegraphed attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EliteKind {
    Rusher,
    Marksman,
    Warden,
    Bomber,
    Blinker,
    Bulwark,
    Lancer,
}

impl EliteKind {
    pub const ALL: [EliteKind; 7] = [
        EliteKind::Rusher,
        EliteKind::Marksman,
        EliteKind::Warden,
        EliteKind::Bomber,
        EliteKind::Blinker,
        EliteKind::Bulwark,
        EliteKind::Lancer,
    ];
}

/// Four-phase elite attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElitePhase {
    Idle,
    Windup,
    Action,
    Recover,
}

/// Elite extension: kind tag plus the generic phase/cooldown timers every
/// kind's state machine reuses. Only present on elite actors, so ordinary
/// reuse can never carry elite state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elite {
    pub kind: EliteKind,
    pub phase: ElitePhase,
    pub phase_until: f32,
    pub cooldown_until: f32,
    /// Aim snapshot captured at windup start; attacks do not track.
    pub aim: Vec2,
    /// Whether the current attack cycle has already landed its hit.
    pub struck: bool,
}

impl Elite {
    pub fn new(kind: EliteKind, now: f32) -> Self {
        Self {
            kind,
            phase: ElitePhase::Idle,
            phase_until: 0.0,
            cooldown_until: now + 1.0,
            aim: Vec2::ZERO,
            struck: false,
        }
    }
}

/// Projectile fired by an elite at the player.
#[derive(Debug, Clone, Copy)]
pub struct EliteProjectile {
    pub vel: Vec2,
    pub damage: f32,
    /// Zero means a direct hit with no area damage.
    pub blast_radius: f32,
    pub expires_at: f32,
}

/// Temporary line obstacle manifested by a Bulwark; damage crossing the
/// segment is mitigated by the resolver.
#[derive(Debug, Clone, Copy)]
pub struct Barrier {
    pub a: Vec2,
    pub b: Vec2,
    pub expires_at: f32,
}

/// Slow-only area pulsed by a Warden. Never deals damage.
#[derive(Debug, Clone, Copy)]
pub struct SlowField {
    pub radius: f32,
    pub slow: f32,
    pub expires_at: f32,
}

/// Authoritative mirror of the player consumed by contact damage, elite
/// attacks, and lifesteal. Position is synced from the host each frame.
#[derive(Debug, Clone, Copy)]
pub struct PlayerState {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
}

impl PlayerState {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: 14.0,
            hp: 100.0,
            max_hp: 100.0,
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }
}

/// The singular boss actor, kept outside the crowd pool with its own DoT
/// trackers. Crowd-only effects (knockback, domination) do not apply.
#[derive(Debug, Clone, Copy)]
pub struct Boss {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub active: bool,
    pub poison: Option<DotRecord>,
    pub burn: Option<DotRecord>,
    pub shred_until: f32,
}

impl Boss {
    pub fn new(pos: Vec2, max_hp: f32, radius: f32) -> Self {
        Self {
            pos,
            radius,
            hp: max_hp,
            max_hp,
            active: true,
            poison: None,
            burn: None,
            shred_until: 0.0,
        }
    }
}

/// Flat knockback resistance contributed by an actor's size class.
pub fn size_knockback_resist(size: SizeClass) -> f32 {
    match size {
        SizeClass::Small => 0.0,
        SizeClass::Medium => KNOCKBACK_RESIST_MEDIUM,
        SizeClass::Large => KNOCKBACK_RESIST_LARGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_never_exceeds_max() {
        let mut h = Health::new(50.0);
        h.damage(20.0);
        h.heal(1000.0);
        assert_eq!(h.current, 50.0);
    }

    #[test]
    fn health_floors_at_zero() {
        let mut h = Health::new(10.0);
        h.damage(999.0);
        assert_eq!(h.current, 0.0);
        assert!(h.is_dead());
    }

    #[test]
    fn knockback_inactive_when_expired() {
        let kb = Knockback {
            velocity: Vec2::new(100.0, 0.0),
            until: 1.0,
            suppressed_until: 0.0,
        };
        assert!(kb.is_active(0.5));
        assert!(!kb.is_active(1.5));
    }
}
