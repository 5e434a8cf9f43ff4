//! Elite attack state machines.
//!
//! Every kind shares one four-phase cycle: Idle (chase, cooldown) ->
//! Windup (telegraph, aim locked) -> Action (the attack itself) ->
//! Recover -> Idle. Phase boundaries are absolute timestamps; a boundary
//! that lands while the elite is hidden by fog is deferred in small steps
//! rather than fired blind. The kind-specific side effect runs exactly
//! once, at Action entry; only the Lancer also does per-frame work while
//! its beam is live.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    Barrier, Body, Elite, EliteKind, ElitePhase, EliteProjectile, Health, Knockback, PlayerState,
    Position, SlowField, StatusEffects,
};
use crate::constants::*;
use crate::context::SimContext;
use crate::events::{EventQueue, GameEvent};
use crate::external::Walkability;
use crate::systems::projectile::segment_hits_circle;

struct KindTiming {
    windup: f32,
    action: f32,
    recover: f32,
    cooldown: f32,
}

const fn timing(kind: EliteKind) -> KindTiming {
    match kind {
        EliteKind::Rusher => KindTiming {
            windup: RUSHER_WINDUP,
            action: RUSHER_ACTION_HOLD,
            recover: RUSHER_RECOVER,
            cooldown: RUSHER_COOLDOWN,
        },
        EliteKind::Marksman => KindTiming {
            windup: MARKSMAN_WINDUP,
            action: MARKSMAN_ACTION_HOLD,
            recover: MARKSMAN_RECOVER,
            cooldown: MARKSMAN_COOLDOWN,
        },
        EliteKind::Warden => KindTiming {
            windup: WARDEN_WINDUP,
            action: WARDEN_ACTION_HOLD,
            recover: WARDEN_RECOVER,
            cooldown: WARDEN_COOLDOWN,
        },
        EliteKind::Bomber => KindTiming {
            windup: BOMBER_WINDUP,
            action: BOMBER_ACTION_HOLD,
            recover: BOMBER_RECOVER,
            cooldown: BOMBER_COOLDOWN,
        },
        EliteKind::Blinker => KindTiming {
            windup: BLINKER_WINDUP,
            action: BLINKER_ACTION_HOLD,
            recover: BLINKER_RECOVER,
            cooldown: BLINKER_COOLDOWN,
        },
        EliteKind::Bulwark => KindTiming {
            windup: BULWARK_WINDUP,
            action: BULWARK_ACTION_HOLD,
            recover: BULWARK_RECOVER,
            cooldown: BULWARK_COOLDOWN,
        },
        EliteKind::Lancer => KindTiming {
            windup: LANCER_WINDUP,
            action: LANCER_BEAM_DURATION,
            recover: LANCER_RECOVER,
            cooldown: LANCER_COOLDOWN,
        },
    }
}

/// Deferred world mutation produced by the read pass.
enum Effect {
    Telegraph,
    Dash(Vec2),
    Shot {
        from: Vec2,
        vel: Vec2,
        damage: f32,
        blast: f32,
        lifetime: f32,
    },
    Field(Vec2),
    Wall(Vec2, Vec2),
    Blink(Vec2),
    HitPlayer(f32),
}

fn aim_dir(from: Vec2, to: Vec2) -> Vec2 {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        Vec2::X
    } else {
        dir
    }
}

/// Kind-specific Action-entry side effect.
fn perform_action(
    elite: &Elite,
    pos: Vec2,
    radius: f32,
    ctx: &SimContext,
    rng: &mut impl Rng,
    out: &mut Vec<Effect>,
) {
    match elite.kind {
        EliteKind::Rusher => {
            out.push(Effect::Dash(aim_dir(pos, elite.aim)));
        }
        EliteKind::Marksman => {
            let dir = aim_dir(pos, elite.aim);
            out.push(Effect::Shot {
                from: pos + dir * radius,
                vel: dir * MARKSMAN_SHOT_SPEED,
                damage: MARKSMAN_SHOT_DAMAGE,
                blast: MARKSMAN_BLAST_RADIUS,
                lifetime: MARKSMAN_SHOT_LIFETIME,
            });
        }
        EliteKind::Warden => {
            out.push(Effect::Field(elite.aim));
        }
        EliteKind::Bomber => {
            let dir = aim_dir(pos, elite.aim);
            // Fuse timed so the shell detonates over the aim point.
            let fuse = (pos.distance(elite.aim) / BOMBER_SHOT_SPEED).min(BOMBER_MAX_FLIGHT);
            out.push(Effect::Shot {
                from: pos + dir * radius,
                vel: dir * BOMBER_SHOT_SPEED,
                damage: BOMBER_SHOT_DAMAGE,
                blast: BOMBER_BLAST_RADIUS,
                lifetime: fuse,
            });
        }
        EliteKind::Blinker => {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let to = elite.aim + Vec2::from_angle(angle) * BLINKER_RING_RADIUS;
            out.push(Effect::Blink(to));
            if to.distance(ctx.player_pos) <= BLINKER_SLASH_RANGE {
                out.push(Effect::HitPlayer(BLINKER_SLASH_DAMAGE));
            }
            if rng.gen_bool(BLINKER_FOLLOWUP_CHANCE) {
                let dir = aim_dir(to, ctx.player_pos);
                out.push(Effect::Shot {
                    from: to + dir * radius,
                    vel: dir * BLINKER_FOLLOWUP_SPEED,
                    damage: BLINKER_FOLLOWUP_DAMAGE,
                    blast: 0.0,
                    lifetime: BLINKER_FOLLOWUP_LIFETIME,
                });
            }
        }
        EliteKind::Bulwark => {
            let dir = aim_dir(pos, elite.aim);
            let mid = pos + dir * BULWARK_BARRIER_OFFSET;
            let perp = dir.perp() * BULWARK_BARRIER_HALF_LENGTH;
            out.push(Effect::Wall(mid - perp, mid + perp));
        }
        EliteKind::Lancer => {
            // Beam work is per-frame during Action; nothing fires here.
        }
    }
}

/// Run the elite state machines for one update.
pub fn update(
    world: &mut World,
    ctx: &SimContext,
    walkability: &dyn Walkability,
    rng: &mut impl Rng,
    player: &mut PlayerState,
    events: &mut EventQueue,
) {
    puffin::profile_function!();

    let now = ctx.now;
    let mut staged: Vec<(Entity, Elite, Vec<Effect>)> = Vec::new();

    for (entity, (elite, pos, body, health, fx)) in world
        .query::<(&Elite, &Position, &Body, &Health, &StatusEffects)>()
        .iter()
    {
        if health.is_dead() || fx.is_paralyzed(now) || fx.is_dominated(now) {
            continue;
        }

        let mut next = *elite;
        let mut effects = Vec::new();
        let t = timing(elite.kind);
        let pos = pos.0;

        match elite.phase {
            ElitePhase::Idle => {
                if now >= elite.cooldown_until
                    && pos.distance(ctx.player_pos) <= ELITE_ENGAGE_RANGE
                    && ctx.is_visible(pos)
                {
                    next.phase = ElitePhase::Windup;
                    next.phase_until = now + t.windup;
                    next.aim = ctx.player_pos;
                    next.struck = false;
                    effects.push(Effect::Telegraph);
                }
            }
            ElitePhase::Windup => {
                if now >= elite.phase_until {
                    if ctx.is_visible(pos) {
                        perform_action(elite, pos, body.radius, ctx, rng, &mut effects);
                        next.phase = ElitePhase::Action;
                        next.phase_until = now + t.action;
                    } else {
                        // Hidden at the boundary: hold the telegraph.
                        next.phase_until = now + ELITE_FOG_DEFER;
                    }
                }
            }
            ElitePhase::Action => {
                match elite.kind {
                    EliteKind::Rusher => {
                        if !elite.struck {
                            let reach = body.radius + player.radius + 4.0;
                            if pos.distance_squared(player.pos) <= reach * reach {
                                effects.push(Effect::HitPlayer(RUSHER_HIT_DAMAGE));
                                next.struck = true;
                            }
                        }
                    }
                    EliteKind::Lancer => {
                        let dir = aim_dir(pos, elite.aim);
                        let tip = pos + dir * LANCER_BEAM_LENGTH;
                        let half_width = LANCER_BEAM_WIDTH * 0.5 + player.radius;
                        if segment_hits_circle(pos, tip, player.pos, half_width) {
                            effects.push(Effect::HitPlayer(LANCER_BEAM_DPS * ctx.dt));
                        }
                    }
                    _ => {}
                }
                if now >= elite.phase_until {
                    next.phase = ElitePhase::Recover;
                    next.phase_until = now + t.recover;
                }
            }
            ElitePhase::Recover => {
                if now >= elite.phase_until {
                    next.phase = ElitePhase::Idle;
                    next.cooldown_until = now + t.cooldown;
                }
            }
        }

        if !effects.is_empty() || next != *elite {
            staged.push((entity, next, effects));
        }
    }

    for (entity, next, effects) in staged {
        let kind = next.kind;
        if let Ok(mut elite) = world.get::<&mut Elite>(entity) {
            *elite = next;
        }

        for effect in effects {
            match effect {
                Effect::Telegraph => {
                    if let Ok(pos) = world.get::<&Position>(entity).map(|p| p.0) {
                        events.push(GameEvent::EliteTelegraph {
                            entity,
                            kind,
                            position: pos,
                        });
                    }
                }
                Effect::Dash(dir) => {
                    if let Ok(mut kb) = world.get::<&mut Knockback>(entity) {
                        kb.velocity = dir * RUSHER_DASH_SPEED;
                        kb.until = now + RUSHER_ACTION_HOLD;
                        kb.suppressed_until = now + RUSHER_SUPPRESS_WINDOW;
                    }
                }
                Effect::Shot {
                    from,
                    vel,
                    damage,
                    blast,
                    lifetime,
                } => {
                    world.spawn((
                        Position(from),
                        EliteProjectile {
                            vel,
                            damage,
                            blast_radius: blast,
                            expires_at: now + lifetime,
                        },
                    ));
                }
                Effect::Field(at) => {
                    world.spawn((
                        Position(at),
                        SlowField {
                            radius: WARDEN_FIELD_RADIUS,
                            slow: WARDEN_FIELD_SLOW,
                            expires_at: now + WARDEN_FIELD_DURATION,
                        },
                    ));
                }
                Effect::Wall(a, b) => {
                    world.spawn((
                        Position((a + b) * 0.5),
                        Barrier {
                            a,
                            b,
                            expires_at: now + BULWARK_BARRIER_DURATION,
                        },
                    ));
                }
                Effect::Blink(to) => {
                    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
                        let radius =
                            world.get::<&Body>(entity).map(|b| b.radius).unwrap_or(0.0);
                        pos.0 = walkability.clamp_to_walkable(to, radius);
                    }
                }
                Effect::HitPlayer(damage) => {
                    player.damage(damage);
                    events.push(GameEvent::PlayerHit { damage });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GameMode;
    use crate::external::{OpenGround, VisibilityGate};
    use crate::spawning::spawn_elite;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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

    fn run(world: &mut World, ctx: &SimContext, player: &mut PlayerState) -> EventQueue {
        let mut rng = StdRng::seed_from_u64(7);
        let mut events = EventQueue::new();
        update(world, ctx, &OpenGround, &mut rng, player, &mut events);
        events
    }

    fn phase_of(world: &World, e: Entity) -> ElitePhase {
        world.get::<&Elite>(e).unwrap().phase
    }

    #[test]
    fn cycle_advances_through_all_phases_in_order() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Warden, Vec2::new(100.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        let events = run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Windup);
        assert!(events
            .pending()
            .iter()
            .any(|ev| matches!(ev, GameEvent::EliteTelegraph { .. })));

        run(&mut world, &ctx_at(2.0 + WARDEN_WINDUP, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Action);

        let t = 2.0 + WARDEN_WINDUP + WARDEN_ACTION_HOLD;
        run(&mut world, &ctx_at(t, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Recover);

        run(&mut world, &ctx_at(t + WARDEN_RECOVER, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Idle);
        assert!(world.get::<&Elite>(e).unwrap().cooldown_until > t);
    }

    #[test]
    fn idle_elite_out_of_range_never_telegraphs() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Rusher, Vec2::new(5000.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Idle);
    }

    #[test]
    fn rusher_dash_sets_suppressed_knockback() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Rusher, Vec2::new(200.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        let t = 2.0 + RUSHER_WINDUP;
        run(&mut world, &ctx_at(t, Vec2::ZERO), &mut player);

        let kb = *world.get::<&Knockback>(e).unwrap();
        assert!((kb.velocity.length() - RUSHER_DASH_SPEED).abs() < 1e-3);
        assert!(kb.velocity.x < 0.0);
        assert!(kb.is_suppressed(t + 0.1));
    }

    #[test]
    fn marksman_fires_projectile_at_aim_snapshot() {
        let mut world = World::new();
        spawn_elite(&mut world, EliteKind::Marksman, Vec2::new(300.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        // Player moves; the shot still goes to the snapshot taken at windup.
        run(
            &mut world,
            &ctx_at(2.0 + MARKSMAN_WINDUP, Vec2::new(0.0, 400.0)),
            &mut player,
        );

        let shots: Vec<EliteProjectile> = world
            .query::<&EliteProjectile>()
            .iter()
            .map(|(_, p)| *p)
            .collect();
        assert_eq!(shots.len(), 1);
        assert!(shots[0].vel.x < 0.0);
        assert!(shots[0].vel.y.abs() < 1.0);
    }

    #[test]
    fn warden_drops_slow_field_and_bulwark_raises_wall() {
        let mut world = World::new();
        spawn_elite(&mut world, EliteKind::Warden, Vec2::new(100.0, 0.0), 0.0);
        spawn_elite(&mut world, EliteKind::Bulwark, Vec2::new(0.0, 100.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        run(&mut world, &ctx_at(2.0 + BULWARK_WINDUP.max(WARDEN_WINDUP), Vec2::ZERO), &mut player);

        assert_eq!(world.query::<&SlowField>().iter().count(), 1);
        assert_eq!(world.query::<&Barrier>().iter().count(), 1);
    }

    #[test]
    fn blinker_lands_on_ring_around_aim() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Blinker, Vec2::new(400.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        run(&mut world, &ctx_at(2.0 + BLINKER_WINDUP, Vec2::ZERO), &mut player);

        let pos = world.get::<&Position>(e).unwrap().0;
        assert!((pos.distance(Vec2::ZERO) - BLINKER_RING_RADIUS).abs() < 1e-2);
    }

    #[test]
    fn lancer_beam_damages_player_every_frame_in_action() {
        let mut world = World::new();
        spawn_elite(&mut world, EliteKind::Lancer, Vec2::new(300.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        let t = 2.0 + LANCER_WINDUP;
        run(&mut world, &ctx_at(t, Vec2::ZERO), &mut player);
        let after_entry = player.hp;
        run(&mut world, &ctx_at(t + 0.1, Vec2::ZERO), &mut player);

        assert!(player.hp < after_entry);
        assert!(player.hp < 100.0);
    }

    #[test]
    fn hidden_windup_boundary_is_deferred_until_visible() {
        let mut world = World::new();
        let e = spawn_elite(&mut world, EliteKind::Marksman, Vec2::new(300.0, 0.0), 0.0);
        let mut player = PlayerState::new(Vec2::ZERO);

        // Enter windup while visible.
        run(&mut world, &ctx_at(2.0, Vec2::ZERO), &mut player);
        assert_eq!(phase_of(&world, e), ElitePhase::Windup);

        // Boundary lands while fogged: the action must not fire.
        let hidden = |_pos: Vec2| false;
        let mut rng = StdRng::seed_from_u64(7);
        let mut events = EventQueue::new();
        let ctx = SimContext {
            mode: GameMode::Siege,
            visibility: Some(&hidden as &dyn VisibilityGate),
            ..ctx_at(2.0 + MARKSMAN_WINDUP, Vec2::ZERO)
        };
        update(&mut world, &ctx, &OpenGround, &mut rng, &mut player, &mut events);
        assert_eq!(phase_of(&world, e), ElitePhase::Windup);
        assert_eq!(world.query::<&EliteProjectile>().iter().count(), 0);

        // Visible again: the deferred boundary fires.
        run(
            &mut world,
            &ctx_at(2.0 + MARKSMAN_WINDUP + ELITE_FOG_DEFER, Vec2::ZERO),
            &mut player,
        );
        assert_eq!(phase_of(&world, e), ElitePhase::Action);
        assert_eq!(world.query::<&EliteProjectile>().iter().count(), 1);
    }
}
