//! Uniform-grid spatial index for proximity queries over live actors.
//!
//! Rebuilt once per update from the live actor set; buckets are kept
//! between rebuilds so steady-state frames do not allocate. Queries return
//! a cell superset — exact radius filtering is the caller's job.

use std::collections::HashMap;

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Health, Hostile, Position};
use crate::constants::SPATIAL_CELL_SIZE;

#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<Entity>>,
    rebuilt_once: bool,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_of(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / SPATIAL_CELL_SIZE).floor() as i32,
            (pos.y / SPATIAL_CELL_SIZE).floor() as i32,
        )
    }

    /// Clear and re-insert every live hostile. Called once per update tick;
    /// dead or despawned actors are never present afterwards.
    pub fn rebuild(&mut self, world: &World) {
        puffin::profile_function!();

        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        for (entity, (pos, _, health)) in world.query::<(&Position, &Hostile, &Health)>().iter() {
            if health.is_dead() {
                continue;
            }
            self.cells.entry(Self::cell_of(pos.0)).or_default().push(entity);
        }

        self.rebuilt_once = true;
    }

    /// All actors whose bounding circle may overlap the query circle.
    /// Cost is bounded by the cells touched, not the total actor count.
    /// Before the first rebuild this returns an empty set.
    pub fn query(&self, center: Vec2, radius: f32) -> Vec<Entity> {
        let mut out = Vec::new();
        self.query_into(center, radius, &mut out);
        out
    }

    /// Allocation-reusing variant of [`query`](Self::query).
    pub fn query_into(&self, center: Vec2, radius: f32, out: &mut Vec<Entity>) {
        out.clear();
        if self.cells.is_empty() {
            return;
        }

        let min = Self::cell_of(center - Vec2::splat(radius));
        let max = Self::cell_of(center + Vec2::splat(radius));
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Whether the index has been rebuilt at least once this run.
    pub fn is_ready(&self) -> bool {
        self.rebuilt_once
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Body, SizeClass};

    fn spawn_at(world: &mut World, x: f32, y: f32) -> Entity {
        world.spawn((
            Position::new(x, y),
            Hostile,
            Health::new(10.0),
            Body {
                radius: 12.0,
                size: SizeClass::Small,
                base_speed: 100.0,
                contact_damage: 5.0,
                xp_reward: 1,
            },
        ))
    }

    #[test]
    fn query_before_rebuild_is_empty() {
        let grid = SpatialGrid::new();
        assert!(grid.query(Vec2::ZERO, 100.0).is_empty());
    }

    #[test]
    fn query_returns_superset_of_nearby_actors() {
        let mut world = World::new();
        let near = spawn_at(&mut world, 10.0, 10.0);
        let far = spawn_at(&mut world, 5000.0, 5000.0);

        let mut grid = SpatialGrid::new();
        grid.rebuild(&world);

        let hits = grid.query(Vec2::ZERO, 100.0);
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }

    #[test]
    fn dead_actors_are_not_indexed() {
        let mut world = World::new();
        let e = spawn_at(&mut world, 10.0, 10.0);
        world.get::<&mut Health>(e).unwrap().current = 0.0;

        let mut grid = SpatialGrid::new();
        grid.rebuild(&world);
        assert!(grid.query(Vec2::ZERO, 100.0).is_empty());
    }

    #[test]
    fn rebuild_drops_despawned_actors() {
        let mut world = World::new();
        let e = spawn_at(&mut world, 10.0, 10.0);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&world);
        assert_eq!(grid.query(Vec2::ZERO, 100.0).len(), 1);

        world.despawn(e).unwrap();
        grid.rebuild(&world);
        assert!(grid.query(Vec2::ZERO, 100.0).is_empty());
    }
}
