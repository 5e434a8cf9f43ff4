//! Status effect engine: poison, burn, mark, paralysis, and domination.
//!
//! Each kind is an independent record on the actor with its own tick
//! cadence, driven by `next_tick_at` timestamps compared against the
//! frame-cached now. Tick damage is routed through the damage resolver so
//! DoT contributes (reduced) lifesteal like any other indirect damage.

use glam::Vec2;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::{DotRecord, Health, PlayerState, Position, StatusEffects};
use crate::constants::*;
use crate::context::SimContext;
use crate::events::EventQueue;
use crate::spatial_grid::SpatialGrid;
use crate::systems::combat::{self, SourceKind};

/// Host-tunable effect multipliers, loadable from JSON balance data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffectTuning {
    /// Multiplicative level/upgrade factor applied to every DoT tick.
    pub level_factor: f32,
    /// Evolved-state bonus applied to every DoT tick.
    pub evolved_bonus: f32,
    /// Evolved poison ignores the poison stack cap.
    pub evolved_poison: bool,
    /// Global damage multiplier applied to every DoT tick.
    pub global_damage_mult: f32,
    /// Fraction of dealt damage returned to the owner as healing.
    pub lifesteal_fraction: f32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            level_factor: 1.0,
            evolved_bonus: 1.0,
            evolved_poison: false,
            global_damage_mult: 1.0,
            lifesteal_fraction: 0.0,
        }
    }
}

pub(crate) fn refresh_record(
    record: &mut Option<DotRecord>,
    now: f32,
    duration: f32,
    interval: f32,
    per_stack: f32,
    cap: Option<u32>,
) {
    match record {
        Some(r) => {
            r.stacks = match cap {
                Some(cap) => (r.stacks + 1).min(cap),
                None => r.stacks + 1,
            };
            r.expires_at = now + duration;
            // Keep the strongest seed seen this window.
            r.per_stack = r.per_stack.max(per_stack);
        }
        None => {
            *record = Some(DotRecord {
                stacks: 1,
                expires_at: now + duration,
                next_tick_at: now + interval,
                per_stack,
            });
        }
    }
}

/// Add a poison stack and refresh its duration. Capped unless the evolved
/// tuning flag is set.
pub fn apply_poison(fx: &mut StatusEffects, now: f32, tuning: &EffectTuning) {
    let cap = if tuning.evolved_poison {
        None
    } else {
        Some(POISON_MAX_STACKS)
    };
    refresh_record(
        &mut fx.poison,
        now,
        POISON_DURATION,
        POISON_TICK_INTERVAL,
        POISON_BASE_PER_STACK,
        cap,
    );
}

/// Seed or refresh a burn. `per_stack` is derived from the damage of the
/// seeding hit by the resolver.
pub fn apply_burn(fx: &mut StatusEffects, now: f32, per_stack: f32) {
    refresh_record(
        &mut fx.burn,
        now,
        BURN_DURATION,
        BURN_TICK_INTERVAL,
        per_stack,
        Some(BURN_MAX_STACKS),
    );
}

/// Add a mark stack and refresh its duration.
pub fn apply_mark(fx: &mut StatusEffects, now: f32) {
    refresh_record(
        &mut fx.mark,
        now,
        MARK_DURATION,
        MARK_TICK_INTERVAL,
        MARK_BASE_PER_STACK,
        Some(MARK_MAX_STACKS),
    );
}

/// Full-stop paralysis until `now + duration`.
pub fn apply_paralysis(fx: &mut StatusEffects, now: f32, duration: f32) {
    fx.paralyzed_until = fx.paralyzed_until.max(now + duration);
}

/// Mind-control: the actor retargets hostiles and pulses damage at them.
pub fn apply_domination(fx: &mut StatusEffects, now: f32, duration: f32) {
    fx.dominated_until = fx.dominated_until.max(now + duration);
    if fx.domination_next_pulse_at <= now {
        fx.domination_next_pulse_at = now + DOMINATION_PULSE_INTERVAL;
    }
}

/// Open (or refresh) the shred vulnerability window.
pub fn apply_shred(fx: &mut StatusEffects, now: f32) {
    fx.shred_until = now + SHRED_DURATION;
}

/// Damage dealt by one tick of a DoT record.
pub fn tick_damage(record: &DotRecord, tuning: &EffectTuning, interval: f32) -> f32 {
    record.per_stack
        * tuning.level_factor
        * tuning.evolved_bonus
        * tuning.global_damage_mult
        * record.stacks as f32
        * interval
}

/// Movement slow from an actor's own effects: the MAX across contributors,
/// never a sum. Paralysis is a full stop and bypasses the ceiling; all
/// other sources are clamped.
pub fn slow_fraction(fx: &StatusEffects, now: f32) -> f32 {
    if fx.is_paralyzed(now) {
        return 1.0;
    }
    let mut slow = 0.0f32;
    if let Some(p) = &fx.poison {
        if p.expires_at > now {
            slow = slow.max((p.stacks as f32 * POISON_SLOW_PER_STACK).min(POISON_SLOW_CEILING));
        }
    }
    if let Some(m) = &fx.mark {
        if m.expires_at > now {
            slow = slow.max(MARK_SLOW);
        }
    }
    slow.min(SLOW_CEILING)
}

/// Advance a DoT record against the frame-cached now. Returns the total
/// damage owed by ticks that fired, and clears the record on expiry.
pub(crate) fn advance_record(
    record: &mut Option<DotRecord>,
    now: f32,
    interval: f32,
    tuning: &EffectTuning,
) -> f32 {
    let Some(r) = record else { return 0.0 };
    let mut owed = 0.0;
    while r.next_tick_at <= now && r.next_tick_at <= r.expires_at {
        owed += tick_damage(r, tuning, interval);
        r.next_tick_at += interval;
    }
    if now >= r.expires_at {
        *record = None;
    }
    owed
}

/// Run one status-effect pass: fire due DoT ticks, expire records, and
/// pulse domination damage. Invoked once per update after movement.
pub fn update(
    world: &mut World,
    grid: &SpatialGrid,
    ctx: &SimContext,
    tuning: &EffectTuning,
    player: &mut PlayerState,
    events: &mut EventQueue,
) {
    puffin::profile_function!();

    let now = ctx.now;
    let mut pending: Vec<(Entity, f32, SourceKind, Vec2)> = Vec::new();
    let mut pulses: Vec<(Entity, Vec2)> = Vec::new();

    for (entity, (fx, health, pos)) in
        world.query_mut::<(&mut StatusEffects, &Health, &Position)>()
    {
        if health.is_dead() {
            continue;
        }

        let poison = advance_record(&mut fx.poison, now, POISON_TICK_INTERVAL, tuning);
        if poison > 0.0 {
            pending.push((entity, poison, SourceKind::PoisonTick, pos.0));
        }
        let burn = advance_record(&mut fx.burn, now, BURN_TICK_INTERVAL, tuning);
        if burn > 0.0 {
            pending.push((entity, burn, SourceKind::BurnTick, pos.0));
        }
        let mark = advance_record(&mut fx.mark, now, MARK_TICK_INTERVAL, tuning);
        if mark > 0.0 {
            pending.push((entity, mark, SourceKind::MarkTick, pos.0));
        }

        if fx.is_dominated(now) && fx.domination_next_pulse_at <= now {
            fx.domination_next_pulse_at = now + DOMINATION_PULSE_INTERVAL;
            pulses.push((entity, pos.0));
        }
    }

    for (entity, amount, source, pos) in pending {
        combat::apply_damage(
            world,
            entity,
            amount,
            false,
            false,
            source,
            pos,
            1,
            true,
            ctx,
            tuning,
            player,
            events,
        );
    }

    // Dominated actors pulse small-radius damage at non-dominated hostiles.
    for (source_entity, source_pos) in pulses {
        let neighbors = grid.query(source_pos, DOMINATION_PULSE_RADIUS);
        for target in neighbors {
            if target == source_entity {
                continue;
            }
            let skip = world
                .get::<&StatusEffects>(target)
                .map(|fx| fx.is_dominated(now))
                .unwrap_or(true);
            if skip {
                continue;
            }
            let in_range = world
                .get::<&Position>(target)
                .map(|p| p.0.distance(source_pos) <= DOMINATION_PULSE_RADIUS)
                .unwrap_or(false);
            if !in_range {
                continue;
            }
            combat::apply_damage(
                world,
                target,
                DOMINATION_PULSE_DAMAGE,
                false,
                false,
                SourceKind::DominationPulse,
                source_pos,
                1,
                true,
                ctx,
                tuning,
                player,
                events,
            );
        }
    }
}
