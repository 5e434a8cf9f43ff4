//! Crowd movement: chase steering, knockback integration, slows, contact
//! damage, and pairwise separation.
//!
//! Runs in two passes per update. The first pass moves every actor (or
//! integrates its knockback) against a pre-move snapshot, so ordering
//! within the pass cannot bias targeting. The second pass resolves
//! overlaps with a partial separation push.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{
    Body, ContactAttack, Elite, ElitePhase, Health, Hostile, Knockback, PlayerState, Position,
    SlowField, StatusEffects,
};
use crate::constants::*;
use crate::context::SimContext;
use crate::events::{EventQueue, GameEvent};
use crate::external::Walkability;
use crate::spatial_grid::SpatialGrid;
use crate::systems::effects;

/// Combined movement slow for one actor: the max of its own effect slow
/// and any slow field covering it, never a sum.
fn combined_slow(
    fx: &StatusEffects,
    pos: Vec2,
    now: f32,
    fields: &[(Vec2, f32, f32)],
) -> f32 {
    let own = effects::slow_fraction(fx, now);
    if own >= 1.0 {
        return 1.0;
    }
    let mut slow = own;
    for &(center, radius, field_slow) in fields {
        if pos.distance_squared(center) <= radius * radius {
            slow = slow.max(field_slow);
        }
    }
    slow.min(SLOW_CEILING)
}

/// Run one movement pass over every live hostile.
pub fn update(
    world: &mut World,
    grid: &SpatialGrid,
    ctx: &SimContext,
    walkability: &dyn Walkability,
    player: &mut PlayerState,
    events: &mut EventQueue,
) {
    puffin::profile_function!();

    let now = ctx.now;
    let dt = ctx.dt;

    // Live slow fields, snapshotted once.
    let fields: Vec<(Vec2, f32, f32)> = world
        .query::<(&Position, &SlowField)>()
        .iter()
        .filter(|(_, (_, f))| f.expires_at > now)
        .map(|(_, (pos, f))| (pos.0, f.radius, f.slow))
        .collect();

    // Pre-move hostile snapshot for domination retargeting.
    let hostiles: Vec<(Entity, Vec2, bool)> = world
        .query::<(&Position, &StatusEffects, &Health, &Hostile)>()
        .iter()
        .filter(|(_, (_, _, health, _))| !health.is_dead())
        .map(|(entity, (pos, fx, _, _))| (entity, pos.0, fx.is_dominated(now)))
        .collect();

    for (entity, (pos, kb, fx, body, contact, health, _, elite)) in world.query_mut::<(
        &mut Position,
        &mut Knockback,
        &StatusEffects,
        &Body,
        &mut ContactAttack,
        &Health,
        &Hostile,
        Option<&Elite>,
    )>() {
        if health.is_dead() {
            continue;
        }

        // Elites plant themselves for the duration of an attack cycle.
        let rooted = elite.map(|e| e.phase != ElitePhase::Idle).unwrap_or(false);

        if kb.is_active(now) {
            // Knockback overrides steering entirely while active.
            pos.0 += kb.velocity * dt;
            kb.velocity *= (1.0 - KNOCKBACK_DECAY * dt).max(0.0);
        } else if rooted {
            // No steering; contact damage below still applies.
        } else {
            let target = if fx.is_dominated(now) {
                nearest_non_dominated(&hostiles, entity, pos.0)
            } else {
                Some(ctx.chase_override.unwrap_or(ctx.player_pos))
            };

            if let Some(target) = target {
                let slow = combined_slow(fx, pos.0, now, &fields);
                let speed = body.base_speed * (1.0 - slow);
                if speed > 0.0 {
                    let to_target = target - pos.0;
                    let dist = to_target.length();
                    if dist > 1e-3 {
                        let step = (speed * dt).min(dist);
                        pos.0 += to_target / dist * step;
                    }
                }
            }
        }

        pos.0 = walkability.clamp_to_walkable(pos.0, body.radius);

        // Contact damage against the player. Dominated actors fight the
        // crowd instead, paralyzed actors cannot attack.
        if !fx.is_dominated(now) && !fx.is_paralyzed(now) && now >= contact.next_hit_at {
            let reach = body.radius + player.radius;
            if pos.0.distance_squared(player.pos) <= reach * reach {
                player.damage(body.contact_damage);
                contact.next_hit_at = now + CONTACT_HIT_INTERVAL;
                events.push(GameEvent::PlayerHit {
                    damage: body.contact_damage,
                });
            }
        }
    }

    separate(world, grid, walkability);
}

fn nearest_non_dominated(
    hostiles: &[(Entity, Vec2, bool)],
    me: Entity,
    pos: Vec2,
) -> Option<Vec2> {
    let mut best: Option<(f32, Vec2)> = None;
    for &(entity, other, dominated) in hostiles {
        if entity == me || dominated {
            continue;
        }
        let d2 = pos.distance_squared(other);
        if d2 > DOMINATION_RETARGET_RADIUS * DOMINATION_RETARGET_RADIUS {
            continue;
        }
        if best.map(|(b, _)| d2 < b).unwrap_or(true) {
            best = Some((d2, other));
        }
    }
    best.map(|(_, target)| target)
}

/// Push overlapping neighbors apart by a fraction of the overlap. Partial
/// on purpose: full resolution in one frame makes dense packs jitter.
fn separate(world: &mut World, grid: &SpatialGrid, walkability: &dyn Walkability) {
    puffin::profile_function!();

    let snapshot: std::collections::HashMap<Entity, (Vec2, f32)> = world
        .query::<(&Position, &Body, &Health, &Hostile)>()
        .iter()
        .filter(|(_, (_, _, health, _))| !health.is_dead())
        .map(|(entity, (pos, body, _, _))| (entity, (pos.0, body.radius)))
        .collect();
    if snapshot.len() < 2 {
        return;
    }

    let mut pushes: Vec<(Entity, Vec2)> = Vec::new();
    let mut neighbors = Vec::new();
    for (&entity, &(pos, radius)) in &snapshot {
        neighbors.clear();
        grid.query_into(pos, radius + LARGE_RADIUS, &mut neighbors);

        let mut push = Vec2::ZERO;
        for &other in &neighbors {
            if other == entity {
                continue;
            }
            // Exact check against the snapshot, not the (stale) grid cell.
            let Some(&(other_pos, other_radius)) = snapshot.get(&other) else {
                continue;
            };
            let delta = pos - other_pos;
            let dist = delta.length();
            let min_dist = radius + other_radius;
            if dist < min_dist {
                let dir = if dist > 1e-3 { delta / dist } else { Vec2::X };
                push += dir * (min_dist - dist) * SEPARATION_PUSH * 0.5;
            }
        }
        if push != Vec2::ZERO {
            pushes.push((entity, push));
        }
    }

    for (entity, push) in pushes {
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            let radius = world.get::<&Body>(entity).map(|b| b.radius).unwrap_or(0.0);
            pos.0 = walkability.clamp_to_walkable(pos.0 + push, radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GameMode;
    use crate::external::OpenGround;
    use crate::spawning;

    fn ctx_at(now: f32, player_pos: Vec2) -> SimContext<'static> {
        SimContext {
            now,
            dt: 1.0 / 60.0,
            player_pos,
            avg_frame_ms: 16.0,
            low_fx: false,
            mode: GameMode::Standard,
            visibility: None,
            chase_override: None,
        }
    }

    fn run(world: &mut World, ctx: &SimContext, player: &mut PlayerState) {
        let mut grid = SpatialGrid::new();
        grid.rebuild(world);
        let mut events = EventQueue::new();
        update(world, &grid, ctx, &OpenGround, player, &mut events);
    }

    #[test]
    fn actor_closes_distance_to_player() {
        let mut world = World::new();
        let e = spawning::SMALL.spawn(&mut world, Vec2::new(300.0, 0.0));
        let mut player = PlayerState::new(Vec2::ZERO);
        let ctx = ctx_at(1.0, Vec2::ZERO);

        run(&mut world, &ctx, &mut player);
        let pos = world.get::<&Position>(e).unwrap().0;
        assert!(pos.x < 300.0);
        assert_eq!(pos.y, 0.0);
    }

    #[test]
    fn paralyzed_actor_does_not_move() {
        let mut world = World::new();
        let e = spawning::SMALL.spawn(&mut world, Vec2::new(300.0, 0.0));
        world.get::<&mut StatusEffects>(e).unwrap().paralyzed_until = 5.0;
        let mut player = PlayerState::new(Vec2::ZERO);
        let ctx = ctx_at(1.0, Vec2::ZERO);

        run(&mut world, &ctx, &mut player);
        assert_eq!(world.get::<&Position>(e).unwrap().0, Vec2::new(300.0, 0.0));
    }

    #[test]
    fn slow_field_takes_max_with_own_slow() {
        let mut world = World::new();
        let slowed = spawning::SMALL.spawn(&mut world, Vec2::new(300.0, 0.0));
        let free = spawning::SMALL.spawn(&mut world, Vec2::new(500.0, 0.0));
        world.spawn((
            Position::new(300.0, 0.0),
            SlowField {
                radius: 100.0,
                slow: 0.5,
                expires_at: 10.0,
            },
        ));
        let mut player = PlayerState::new(Vec2::ZERO);
        let ctx = ctx_at(1.0, Vec2::ZERO);

        run(&mut world, &ctx, &mut player);
        let slowed_step = 300.0 - world.get::<&Position>(slowed).unwrap().0.x;
        let free_step = 500.0 - world.get::<&Position>(free).unwrap().0.x;
        assert!(slowed_step > 0.0);
        assert!(slowed_step < free_step);
    }

    #[test]
    fn knockback_overrides_chase_and_decays() {
        let mut world = World::new();
        let e = spawning::SMALL.spawn(&mut world, Vec2::new(100.0, 0.0));
        {
            let mut kb = world.get::<&mut Knockback>(e).unwrap();
            kb.velocity = Vec2::new(600.0, 0.0);
            kb.until = 2.0;
        }
        let mut player = PlayerState::new(Vec2::ZERO);
        let ctx = ctx_at(1.0, Vec2::ZERO);

        run(&mut world, &ctx, &mut player);
        // Pushed away from the player despite chasing it.
        assert!(world.get::<&Position>(e).unwrap().0.x > 100.0);
        let kb = *world.get::<&Knockback>(e).unwrap();
        assert!(kb.velocity.x < 600.0);
    }

    #[test]
    fn contact_damage_respects_cooldown() {
        let mut world = World::new();
        spawning::SMALL.spawn(&mut world, Vec2::new(5.0, 0.0));
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(1.0, Vec2::ZERO), &mut player);
        let after_first = player.hp;
        assert!((100.0 - after_first - SMALL_CONTACT_DAMAGE).abs() < 1e-4);

        // Next frame is inside the cooldown window.
        run(&mut world, &ctx_at(1.02, Vec2::ZERO), &mut player);
        assert_eq!(player.hp, after_first);

        // Past the cooldown it hits again.
        run(&mut world, &ctx_at(1.0 + CONTACT_HIT_INTERVAL, Vec2::ZERO), &mut player);
        assert!(player.hp < after_first);
    }

    #[test]
    fn dominated_actor_chases_hostiles_not_player() {
        let mut world = World::new();
        let dominated = spawning::SMALL.spawn(&mut world, Vec2::new(100.0, 0.0));
        spawning::SMALL.spawn(&mut world, Vec2::new(200.0, 0.0));
        world.get::<&mut StatusEffects>(dominated).unwrap().dominated_until = 10.0;
        let mut player = PlayerState::new(Vec2::ZERO);
        let ctx = ctx_at(1.0, Vec2::ZERO);

        run(&mut world, &ctx, &mut player);
        // Moves toward the hostile at x=200, away from the player at origin.
        assert!(world.get::<&Position>(dominated).unwrap().0.x > 100.0);
        assert_eq!(player.hp, 100.0);
    }

    #[test]
    fn overlapping_actors_are_pushed_apart() {
        let mut world = World::new();
        let a = spawning::SMALL.spawn(&mut world, Vec2::new(1000.0, 0.0));
        let b = spawning::SMALL.spawn(&mut world, Vec2::new(1004.0, 0.0));
        let mut player = PlayerState::new(Vec2::new(1002.0, 2000.0));
        let ctx = ctx_at(1.0, player.pos);

        run(&mut world, &ctx, &mut player);
        let pa = world.get::<&Position>(a).unwrap().0;
        let pb = world.get::<&Position>(b).unwrap().0;
        assert!(pa.distance(pb) > 4.0);
    }
}
