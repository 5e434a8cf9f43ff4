//! Elite projectile flight and detonation.
//!
//! Projectiles move along their stored velocity each update. Player hits
//! are swept segment-vs-circle so fast shots cannot tunnel through the
//! hitbox at low frame rates. Blast-carrying shells also detonate at end
//! of flight.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{EliteProjectile, PlayerState, Position};
use crate::context::SimContext;
use crate::events::{EventQueue, GameEvent};

/// Whether the segment `a`-`b` passes within `radius` of `center`.
pub fn segment_hits_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq <= 1e-9 {
        0.0
    } else {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    center.distance_squared(closest) <= radius * radius
}

/// Advance all elite projectiles one step and resolve hits and expiry.
pub fn update(
    world: &mut World,
    ctx: &SimContext,
    player: &mut PlayerState,
    events: &mut EventQueue,
) {
    puffin::profile_function!();

    // (position, blast radius, damage, damage already applied on impact)
    let mut detonations: Vec<(Vec2, f32, f32, bool)> = Vec::new();
    let mut direct_hits: Vec<f32> = Vec::new();
    let mut remove: Vec<Entity> = Vec::new();

    for (entity, (pos, proj)) in world.query_mut::<(&mut Position, &EliteProjectile)>() {
        let from = pos.0;
        let to = from + proj.vel * ctx.dt;
        pos.0 = to;

        if segment_hits_circle(from, to, player.pos, player.radius) {
            direct_hits.push(proj.damage);
            if proj.blast_radius > 0.0 {
                detonations.push((to, proj.blast_radius, proj.damage, true));
            }
            remove.push(entity);
        } else if ctx.now >= proj.expires_at {
            if proj.blast_radius > 0.0 {
                detonations.push((to, proj.blast_radius, proj.damage, false));
            }
            remove.push(entity);
        }
    }

    for damage in direct_hits {
        player.damage(damage);
        events.push(GameEvent::PlayerHit { damage });
    }

    for (position, radius, damage, already_hit) in detonations {
        events.push(GameEvent::ProjectileExploded { position, radius });
        // A direct hit already paid its damage; only end-of-flight
        // detonations check the blast circle.
        if !already_hit && position.distance_squared(player.pos) <= radius * radius {
            player.damage(damage);
            events.push(GameEvent::PlayerHit { damage });
        }
    }

    for entity in remove {
        let _ = world.despawn(entity);
    }
}
