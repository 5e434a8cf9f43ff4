//! Common read-only query helpers over the actor world.
//!
//! These reduce repetition across systems and back the public snapshot
//! surface; none of them mutate state.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Body, Elite, EliteKind, Health, Hostile, Position};
use crate::constants::SPATIAL_CELL_SIZE;
use crate::spatial_grid::SpatialGrid;

/// Immutable snapshot of one live actor, safe to hand to the host.
#[derive(Debug, Clone, Copy)]
pub struct ActorSnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub elite: Option<EliteKind>,
}

/// All live actors whose bounding circle overlaps the query circle.
/// Grid superset first, exact distance filter second.
pub fn actors_in_radius(
    world: &World,
    grid: &SpatialGrid,
    center: Vec2,
    radius: f32,
) -> Vec<Entity> {
    let mut out = Vec::new();
    // One cell of padding absorbs body radii and the movement applied
    // since the index was last rebuilt.
    for entity in grid.query(center, radius + SPATIAL_CELL_SIZE) {
        let Ok(pos) = world.get::<&Position>(entity) else {
            continue;
        };
        let body_radius = world.get::<&Body>(entity).map(|b| b.radius).unwrap_or(0.0);
        if pos.0.distance(center) <= radius + body_radius {
            out.push(entity);
        }
    }
    out
}

/// Snapshot every live hostile. Dead actors are excluded; a dead actor is
/// despawned by compaction within the same update that killed it.
pub fn active_actors(world: &World) -> Vec<ActorSnapshot> {
    world
        .query::<(&Position, &Body, &Health, &Hostile)>()
        .iter()
        .filter(|(_, (_, _, health, _))| !health.is_dead())
        .map(|(entity, (pos, body, health, _))| ActorSnapshot {
            entity,
            position: pos.0,
            radius: body.radius,
            hp: health.current,
            max_hp: health.max,
            elite: world.get::<&Elite>(entity).ok().map(|e| e.kind),
        })
        .collect()
}

/// Positions of all living elites, with kinds (used for placement scoring
/// and soft caps).
pub fn living_elites(world: &World) -> Vec<(Entity, EliteKind, Vec2)> {
    world
        .query::<(&Position, &Elite, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| !health.is_dead())
        .map(|(entity, (pos, elite, _))| (entity, elite.kind, pos.0))
        .collect()
}

/// Count of living elites of one kind.
pub fn living_elite_count(world: &World, kind: EliteKind) -> usize {
    world
        .query::<(&Elite, &Health)>()
        .iter()
        .filter(|(_, (elite, health))| elite.kind == kind && !health.is_dead())
        .count()
}

/// Count of all live hostiles.
pub fn live_actor_count(world: &World) -> usize {
    world
        .query::<(&Health, &Hostile)>()
        .iter()
        .filter(|(_, (health, _))| !health.is_dead())
        .count()
}

/// Whether an actor handle refers to a dead or despawned actor.
pub fn is_actor_dead(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| h.is_dead())
        .unwrap_or(true)
}
