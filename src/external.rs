//! Seams for external collaborators the simulation consults but never owns.
//!
//! Absent collaborators degrade to pass-through behavior rather than
//! failing: no walkability oracle means raw coordinates, no visibility gate
//! means everything is visible.

use glam::Vec2;

/// Walkability oracle owned by the room/corridor subsystem. The simulation
/// only ever asks it to clamp a point into walkable space.
pub trait Walkability {
    fn clamp_to_walkable(&self, pos: Vec2, radius: f32) -> Vec2;
}

/// Pass-through oracle used when no room geometry is registered.
#[derive(Debug, Default)]
pub struct OpenGround;

impl Walkability for OpenGround {
    fn clamp_to_walkable(&self, pos: Vec2, _radius: f32) -> Vec2 {
        pos
    }
}

/// Visibility predicate for modes with partial map visibility. Actors at
/// hidden positions are immune to damage and defer elite phase changes.
pub trait VisibilityGate {
    fn is_visible(&self, pos: Vec2) -> bool;
}

impl<F: Fn(Vec2) -> bool> VisibilityGate for F {
    fn is_visible(&self, pos: Vec2) -> bool {
        self(pos)
    }
}
