//! Damage and knockback resolution.
//!
//! `apply_damage` is the single legal path for crowd health mutation; the
//! elite subsystem's own melee and pulse logic calls back into it. Source
//! behavior (knockback force, suppression, on-hit seeding) is a closed
//! policy table, so adding a source kind is a data change rather than new
//! branches scattered through the resolver.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    size_knockback_resist, Barrier, Body, Boss, Health, Knockback, PlayerState, Position,
    StatusEffects,
};
use crate::constants::*;
use crate::context::SimContext;
use crate::events::{EventQueue, GameEvent};
use crate::systems::effects::{self, EffectTuning};

/// Closed set of damage source kinds. External weapon fire and internal
/// effect ticks share the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Melee sweep; seeds the shred vulnerability window.
    Blade,
    /// Direct projectile hit.
    Bolt,
    /// Incendiary hit; seeds a burn stack from the damage dealt.
    Flame,
    /// Continuous beam; never applies knockback.
    Beam,
    /// Area burst with heavy knockback.
    Blast,
    PoisonTick,
    BurnTick,
    MarkTick,
    DominationPulse,
}

/// Per-source policy data consulted by the resolver.
#[derive(Debug, Clone, Copy)]
pub struct SourcePolicy {
    pub base_knockback: f32,
    pub damping: f32,
    pub suppresses_knockback: bool,
    /// Fraction of dealt damage seeded as a burn stack; zero means none.
    pub burn_seed_fraction: f32,
    pub applies_shred: bool,
}

/// Lookup the policy for a source kind.
pub const fn policy(kind: SourceKind) -> SourcePolicy {
    match kind {
        SourceKind::Blade => SourcePolicy {
            base_knockback: 260.0,
            damping: 1.0,
            suppresses_knockback: false,
            burn_seed_fraction: 0.0,
            applies_shred: true,
        },
        SourceKind::Bolt => SourcePolicy {
            base_knockback: 180.0,
            damping: 1.0,
            suppresses_knockback: false,
            burn_seed_fraction: 0.0,
            applies_shred: false,
        },
        SourceKind::Flame => SourcePolicy {
            base_knockback: 90.0,
            damping: 0.8,
            suppresses_knockback: false,
            burn_seed_fraction: 0.35,
            applies_shred: false,
        },
        SourceKind::Beam => SourcePolicy {
            base_knockback: 0.0,
            damping: 0.0,
            suppresses_knockback: true,
            burn_seed_fraction: 0.0,
            applies_shred: false,
        },
        SourceKind::Blast => SourcePolicy {
            base_knockback: 420.0,
            damping: 0.9,
            suppresses_knockback: false,
            burn_seed_fraction: 0.0,
            applies_shred: false,
        },
        SourceKind::PoisonTick
        | SourceKind::BurnTick
        | SourceKind::MarkTick
        | SourceKind::DominationPulse => SourcePolicy {
            base_knockback: 0.0,
            damping: 0.0,
            suppresses_knockback: true,
            burn_seed_fraction: 0.0,
            applies_shred: false,
        },
    }
}

/// Time-based healing-efficiency curve for lifesteal: full until the early
/// window ends, then a linear fade to the floor.
pub fn heal_efficiency(now: f32) -> f32 {
    if now <= HEAL_EFFICIENCY_FULL_UNTIL {
        1.0
    } else if now >= HEAL_EFFICIENCY_FLOOR_AT {
        HEAL_EFFICIENCY_FLOOR
    } else {
        let t = (now - HEAL_EFFICIENCY_FULL_UNTIL)
            / (HEAL_EFFICIENCY_FLOOR_AT - HEAL_EFFICIENCY_FULL_UNTIL);
        1.0 + t * (HEAL_EFFICIENCY_FLOOR - 1.0)
    }
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether segments `p1p2` and `p3p4` properly intersect.
pub fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}

/// Whether a live barrier line crosses the source-to-target segment.
fn barrier_blocks(world: &World, source: Vec2, target: Vec2, now: f32) -> bool {
    if source.distance_squared(target) <= 1e-6 {
        return false;
    }
    world
        .query::<&Barrier>()
        .iter()
        .any(|(_, b)| b.expires_at > now && segments_intersect(source, target, b.a, b.b))
}

/// Resolve one damage application against a crowd actor. Returns the
/// damage actually dealt (zero when the hit was rejected).
///
/// Rejections are silent no-ops by design: a dead or despawned target, or
/// a target outside the visibility gate, must not crash a 60 Hz loop.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage(
    world: &mut World,
    target: Entity,
    amount: f32,
    critical: bool,
    ignore_active_gate: bool,
    source: SourceKind,
    source_pos: Vec2,
    level: u32,
    indirect: bool,
    ctx: &SimContext,
    tuning: &EffectTuning,
    player: &mut PlayerState,
    events: &mut EventQueue,
) -> f32 {
    let amount = if amount.is_finite() {
        amount.clamp(0.0, MAX_DAMAGE_PER_HIT)
    } else {
        0.0
    };
    if amount <= 0.0 {
        return 0.0;
    }

    let Ok(pos) = world.get::<&Position>(target).map(|p| p.0) else {
        return 0.0;
    };
    let Ok((radius, size)) = world.get::<&Body>(target).map(|b| (b.radius, b.size)) else {
        return 0.0;
    };

    // Fog-of-war gate: hidden actors are fully immune, damage and
    // knockback both.
    if !ctx.is_visible(pos) {
        return 0.0;
    }

    let alive = world
        .get::<&Health>(target)
        .map(|h| !h.is_dead())
        .unwrap_or(false);
    if !alive && !ignore_active_gate {
        log::trace!("apply_damage rejected: target {target:?} inactive");
        return 0.0;
    }

    let mut dealt = amount;
    if barrier_blocks(world, source_pos, pos, ctx.now) {
        dealt *= BARRIER_MITIGATION;
    }
    let shredded = world
        .get::<&StatusEffects>(target)
        .map(|fx| fx.is_shredded(ctx.now))
        .unwrap_or(false);
    if shredded {
        dealt *= SHRED_VULNERABILITY_MULTIPLIER;
    }

    let fatal = {
        let Ok(mut health) = world.get::<&mut Health>(target) else {
            return 0.0;
        };
        health.damage(dealt);
        health.is_dead()
    };

    events.push(GameEvent::HitLanded {
        entity: target,
        position: pos,
        damage: dealt,
        critical,
    });

    // Lifesteal to the damage owner; indirect (area/DoT) damage
    // contributes at a reduced share.
    let share = if indirect { LIFESTEAL_INDIRECT_SHARE } else { 1.0 };
    let heal = dealt * tuning.lifesteal_fraction * share * heal_efficiency(ctx.now);
    if heal > 0.0 {
        player.heal(heal);
        events.push(GameEvent::OwnerHealed { amount: heal });
    }

    let pol = policy(source);

    if pol.burn_seed_fraction > 0.0 || pol.applies_shred {
        if let Ok(mut fx) = world.get::<&mut StatusEffects>(target) {
            if pol.burn_seed_fraction > 0.0 {
                let level_scale = 1.0 + BURN_SEED_LEVEL_BONUS * level.saturating_sub(1) as f32;
                effects::apply_burn(&mut fx, ctx.now, dealt * pol.burn_seed_fraction * level_scale);
            }
            if pol.applies_shred {
                effects::apply_shred(&mut fx, ctx.now);
            }
        }
    }

    if !fatal && !pol.suppresses_knockback {
        if let Ok(mut kb) = world.get::<&mut Knockback>(target) {
            if !kb.is_suppressed(ctx.now) {
                let mut dir = (pos - source_pos).normalize_or_zero();
                if dir == Vec2::ZERO {
                    dir = (pos - player.pos).normalize_or_zero();
                }
                if dir == Vec2::ZERO {
                    dir = Vec2::X;
                }

                let resist =
                    KNOCKBACK_RESIST_PER_MINUTE * ctx.minutes() + size_knockback_resist(size);
                let mass = KNOCKBACK_REFERENCE_RADIUS / radius.max(1.0);
                let impulse = pol.base_knockback * pol.damping * mass / (1.0 + resist);

                // Stack onto the radial component only; the non-radial
                // remainder is discarded on each new hit, and the carry is
                // partial so repeated hits do not add linearly forever.
                let radial = dir * kb.velocity.dot(dir).max(0.0);
                let mut velocity = dir * impulse + radial * KNOCKBACK_CARRY;
                let speed = velocity.length();
                if speed > KNOCKBACK_MAX_SPEED {
                    velocity *= KNOCKBACK_MAX_SPEED / speed;
                }
                kb.velocity = velocity;

                let extend = (impulse * KNOCKBACK_TIMER_PER_IMPULSE).min(KNOCKBACK_TIMER_CAP);
                kb.until = (kb.until.max(ctx.now) + extend).min(ctx.now + KNOCKBACK_TIMER_CAP);
            }
        }
    }

    dealt
}

/// Mirror of [`apply_damage`] for the singular boss actor. Crowd-only
/// effects (knockback, domination) are omitted; the boss keeps its own DoT
/// trackers.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_to_boss(
    boss: &mut Boss,
    amount: f32,
    critical: bool,
    source: SourceKind,
    level: u32,
    indirect: bool,
    ctx: &SimContext,
    tuning: &EffectTuning,
    player: &mut PlayerState,
    events: &mut EventQueue,
) -> f32 {
    let amount = if amount.is_finite() {
        amount.clamp(0.0, MAX_DAMAGE_PER_HIT)
    } else {
        0.0
    };
    if amount <= 0.0 || !boss.active || boss.hp <= 0.0 {
        return 0.0;
    }
    if !ctx.is_visible(boss.pos) {
        return 0.0;
    }

    let mut dealt = amount;
    if boss.shred_until > ctx.now {
        dealt *= SHRED_VULNERABILITY_MULTIPLIER;
    }
    boss.hp = (boss.hp - dealt).max(0.0);

    events.push(GameEvent::BossDamaged {
        damage: dealt,
        remaining: boss.hp,
    });
    let _ = critical;

    let share = if indirect { LIFESTEAL_INDIRECT_SHARE } else { 1.0 };
    let heal = dealt * tuning.lifesteal_fraction * share * heal_efficiency(ctx.now);
    if heal > 0.0 {
        player.heal(heal);
        events.push(GameEvent::OwnerHealed { amount: heal });
    }

    let pol = policy(source);
    if pol.burn_seed_fraction > 0.0 {
        let level_scale = 1.0 + BURN_SEED_LEVEL_BONUS * level.saturating_sub(1) as f32;
        effects::refresh_record(
            &mut boss.burn,
            ctx.now,
            BURN_DURATION,
            BURN_TICK_INTERVAL,
            dealt * pol.burn_seed_fraction * level_scale,
            Some(BURN_MAX_STACKS),
        );
    }
    if pol.applies_shred {
        boss.shred_until = ctx.now + SHRED_DURATION;
    }

    if boss.hp <= 0.0 {
        boss.active = false;
        events.push(GameEvent::BossDied { position: boss.pos });
    }

    dealt
}

/// Seed or refresh poison on the boss.
pub fn apply_poison_to_boss(boss: &mut Boss, now: f32, tuning: &EffectTuning) {
    let cap = if tuning.evolved_poison {
        None
    } else {
        Some(POISON_MAX_STACKS)
    };
    effects::refresh_record(
        &mut boss.poison,
        now,
        POISON_DURATION,
        POISON_TICK_INTERVAL,
        POISON_BASE_PER_STACK,
        cap,
    );
}

/// Fire due boss DoT ticks through the boss damage pipeline.
pub fn tick_boss_dots(
    boss: &mut Boss,
    ctx: &SimContext,
    tuning: &EffectTuning,
    player: &mut PlayerState,
    events: &mut EventQueue,
) {
    if !boss.active {
        return;
    }
    let poison = effects::advance_record(&mut boss.poison, ctx.now, POISON_TICK_INTERVAL, tuning);
    if poison > 0.0 {
        apply_damage_to_boss(
            boss,
            poison,
            false,
            SourceKind::PoisonTick,
            1,
            true,
            ctx,
            tuning,
            player,
            events,
        );
    }
    let burn = effects::advance_record(&mut boss.burn, ctx.now, BURN_TICK_INTERVAL, tuning);
    if burn > 0.0 {
        apply_damage_to_boss(
            boss,
            burn,
            false,
            SourceKind::BurnTick,
            1,
            true,
            ctx,
            tuning,
            player,
            events,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GameMode;
    use crate::external::VisibilityGate;
    use crate::spawning;

    fn ctx_at(now: f32) -> SimContext<'static> {
        SimContext {
            now,
            dt: 1.0 / 60.0,
            player_pos: Vec2::ZERO,
            avg_frame_ms: 16.0,
            low_fx: false,
            mode: GameMode::Standard,
            visibility: None,
            chase_override: None,
        }
    }

    fn harness() -> (World, Entity, PlayerState, EventQueue) {
        let mut world = World::new();
        let e = spawning::MEDIUM.spawn(&mut world, Vec2::new(100.0, 0.0));
        let player = PlayerState::new(Vec2::ZERO);
        (world, e, PlayerState { hp: 50.0, ..player }, EventQueue::new())
    }

    #[test]
    fn direct_lifesteal_heals_full_fraction() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning {
            lifesteal_fraction: 0.1,
            ..EffectTuning::default()
        };
        let ctx = ctx_at(1.0);

        apply_damage(
            &mut world, e, 50.0, false, false, SourceKind::Bolt, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert!((player.hp - 55.0).abs() < 1e-4);
    }

    #[test]
    fn indirect_lifesteal_heals_quarter_share() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning {
            lifesteal_fraction: 0.1,
            ..EffectTuning::default()
        };
        let ctx = ctx_at(1.0);

        apply_damage(
            &mut world, e, 50.0, false, false, SourceKind::Blast, Vec2::ZERO, 1, true, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert!((player.hp - 51.25).abs() < 1e-4);
    }

    #[test]
    fn beam_source_never_applies_knockback() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);

        apply_damage(
            &mut world, e, 10.0, false, false, SourceKind::Beam, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        let kb = *world.get::<&Knockback>(e).unwrap();
        assert_eq!(kb.velocity, Vec2::ZERO);
    }

    #[test]
    fn knockback_speed_is_clamped_under_stacked_hits() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);

        for _ in 0..50 {
            apply_damage(
                &mut world, e, 1.0, false, false, SourceKind::Blast, Vec2::ZERO, 1, false, &ctx,
                &tuning, &mut player, &mut events,
            );
        }
        let kb = *world.get::<&Knockback>(e).unwrap();
        assert!(kb.velocity.length() <= KNOCKBACK_MAX_SPEED + 1e-3);
    }

    #[test]
    fn damage_to_dead_actor_is_a_noop_without_override() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);
        world.get::<&mut Health>(e).unwrap().current = 0.0;

        let dealt = apply_damage(
            &mut world, e, 25.0, false, false, SourceKind::Bolt, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert_eq!(dealt, 0.0);
    }

    #[test]
    fn hidden_actor_takes_no_damage_or_knockback() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let gate = |_pos: Vec2| false;
        let ctx = SimContext {
            mode: GameMode::Siege,
            visibility: Some(&gate as &dyn VisibilityGate),
            ..ctx_at(1.0)
        };

        let before = world.get::<&Health>(e).unwrap().current;
        let dealt = apply_damage(
            &mut world, e, 30.0, false, false, SourceKind::Blast, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert_eq!(dealt, 0.0);
        assert_eq!(world.get::<&Health>(e).unwrap().current, before);
        assert_eq!(world.get::<&Knockback>(e).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn barrier_reduces_damage_crossing_it() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);
        // Vertical barrier between source (origin) and target at x=100.
        world.spawn((
            Position::new(50.0, 0.0),
            Barrier {
                a: Vec2::new(50.0, -80.0),
                b: Vec2::new(50.0, 80.0),
                expires_at: 10.0,
            },
        ));

        let dealt = apply_damage(
            &mut world, e, 40.0, false, false, SourceKind::Bolt, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert!((dealt - 40.0 * BARRIER_MITIGATION).abs() < 1e-4);
    }

    #[test]
    fn shred_window_amplifies_damage() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);

        // Blade opens the shred window; the next hit is amplified.
        apply_damage(
            &mut world, e, 10.0, false, false, SourceKind::Blade, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        let dealt = apply_damage(
            &mut world, e, 10.0, false, false, SourceKind::Bolt, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        assert!((dealt - 10.0 * SHRED_VULNERABILITY_MULTIPLIER).abs() < 1e-4);
    }

    #[test]
    fn flame_hit_seeds_burn_from_damage_dealt() {
        let (mut world, e, mut player, mut events) = harness();
        let tuning = EffectTuning::default();
        let ctx = ctx_at(1.0);

        apply_damage(
            &mut world, e, 20.0, false, false, SourceKind::Flame, Vec2::ZERO, 1, false, &ctx,
            &tuning, &mut player, &mut events,
        );
        let fx = *world.get::<&StatusEffects>(e).unwrap();
        let burn = fx.burn.expect("burn seeded");
        assert!((burn.per_stack - 20.0 * policy(SourceKind::Flame).burn_seed_fraction).abs() < 1e-4);
    }

    #[test]
    fn boss_pipeline_mirrors_lifesteal_and_death() {
        let mut boss = Boss::new(Vec2::new(0.0, 200.0), 30.0, 40.0);
        let mut player = PlayerState::new(Vec2::ZERO);
        player.hp = 10.0;
        let mut events = EventQueue::new();
        let tuning = EffectTuning {
            lifesteal_fraction: 0.1,
            ..EffectTuning::default()
        };
        let ctx = ctx_at(1.0);

        apply_damage_to_boss(
            &mut boss, 50.0, false, SourceKind::Bolt, 1, false, &ctx, &tuning, &mut player,
            &mut events,
        );
        assert!((player.hp - 15.0).abs() < 1e-4);
        assert!(!boss.active);
        assert!(events
            .pending()
            .iter()
            .any(|e| matches!(e, GameEvent::BossDied { .. })));
    }

    #[test]
    fn heal_efficiency_fades_to_floor() {
        assert_eq!(heal_efficiency(0.0), 1.0);
        assert_eq!(heal_efficiency(HEAL_EFFICIENCY_FULL_UNTIL), 1.0);
        assert_eq!(heal_efficiency(HEAL_EFFICIENCY_FLOOR_AT + 100.0), HEAL_EFFICIENCY_FLOOR);
        let mid = heal_efficiency((HEAL_EFFICIENCY_FULL_UNTIL + HEAL_EFFICIENCY_FLOOR_AT) / 2.0);
        assert!(mid < 1.0 && mid > HEAL_EFFICIENCY_FLOOR);
    }
}
