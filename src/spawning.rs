//! Data-driven actor spawning.
//!
//! Defines the per-size-class archetypes and the component bundles built
//! for ordinary and elite actors. Every field of every component is
//! constructed fresh here, which is what makes pooled-slot reuse safe.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    Body, ContactAttack, Elite, EliteKind, Health, Hostile, Knockback, Position, SizeClass,
    StatusEffects,
};
use crate::constants::*;

/// Definition of an ordinary actor archetype: all the data needed to
/// spawn one.
#[derive(Debug, Clone, Copy)]
pub struct ActorDef {
    pub name: &'static str,
    pub size: SizeClass,
    pub max_health: f32,
    pub radius: f32,
    pub base_speed: f32,
    pub contact_damage: f32,
    pub xp_reward: u32,
}

pub const SMALL: ActorDef = ActorDef {
    name: "skitter",
    size: SizeClass::Small,
    max_health: SMALL_HEALTH,
    radius: SMALL_RADIUS,
    base_speed: SMALL_SPEED,
    contact_damage: SMALL_CONTACT_DAMAGE,
    xp_reward: SMALL_XP,
};

pub const MEDIUM: ActorDef = ActorDef {
    name: "brute",
    size: SizeClass::Medium,
    max_health: MEDIUM_HEALTH,
    radius: MEDIUM_RADIUS,
    base_speed: MEDIUM_SPEED,
    contact_damage: MEDIUM_CONTACT_DAMAGE,
    xp_reward: MEDIUM_XP,
};

pub const LARGE: ActorDef = ActorDef {
    name: "hulk",
    size: SizeClass::Large,
    max_health: LARGE_HEALTH,
    radius: LARGE_RADIUS,
    base_speed: LARGE_SPEED,
    contact_damage: LARGE_CONTACT_DAMAGE,
    xp_reward: LARGE_XP,
};

impl ActorDef {
    pub fn for_size(size: SizeClass) -> &'static ActorDef {
        match size {
            SizeClass::Small => &SMALL,
            SizeClass::Medium => &MEDIUM,
            SizeClass::Large => &LARGE,
        }
    }

    /// Spawn this archetype at the given position with neutral transient
    /// state (no effects, no knockback, contact attack ready).
    pub fn spawn(&self, world: &mut World, pos: Vec2) -> Entity {
        world.spawn((
            Position(pos),
            Hostile,
            Health::new(self.max_health),
            Body {
                radius: self.radius,
                size: self.size,
                base_speed: self.base_speed,
                contact_damage: self.contact_damage,
                xp_reward: self.xp_reward,
            },
            StatusEffects::default(),
            Knockback::default(),
            ContactAttack::default(),
        ))
    }
}

/// Budget cost of one spawn of the given size class.
pub fn spawn_cost(size: SizeClass) -> f32 {
    match size {
        SizeClass::Small => COST_SMALL,
        SizeClass::Medium => COST_MEDIUM,
        SizeClass::Large => COST_LARGE,
    }
}

/// Spawn an elite of the given kind. Elites ride on the medium archetype
/// with boosted health and their own state machine extension.
pub fn spawn_elite(world: &mut World, kind: EliteKind, pos: Vec2, now: f32) -> Entity {
    let base = MEDIUM;
    world.spawn((
        Position(pos),
        Hostile,
        Health::new(base.max_health * ELITE_HEALTH_MULTIPLIER),
        Body {
            radius: base.radius,
            size: base.size,
            base_speed: base.base_speed,
            contact_damage: base.contact_damage,
            xp_reward: base.xp_reward * ELITE_XP_MULTIPLIER,
        },
        StatusEffects::default(),
        Knockback::default(),
        ContactAttack::default(),
        Elite::new(kind, now),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ElitePhase;

    #[test]
    fn spawn_builds_neutral_transient_state() {
        let mut world = World::new();
        let e = SMALL.spawn(&mut world, Vec2::new(5.0, 5.0));

        let fx = *world.get::<&StatusEffects>(e).unwrap();
        assert!(fx.poison.is_none());
        assert!(fx.burn.is_none());
        assert_eq!(fx.dominated_until, 0.0);

        let kb = *world.get::<&Knockback>(e).unwrap();
        assert_eq!(kb.velocity, Vec2::ZERO);

        let health = *world.get::<&Health>(e).unwrap();
        assert_eq!(health.current, health.max);
    }

    #[test]
    fn elite_spawns_idle_with_armed_cooldown() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Rusher, Vec2::ZERO, 10.0);
        let elite = *world.get::<&Elite>(e).unwrap();
        assert_eq!(elite.phase, ElitePhase::Idle);
        assert!(elite.cooldown_until > 10.0);
    }
}
