//! Simulation systems, run in a fixed order each update tick.

pub mod combat;
pub mod director;
pub mod effects;
pub mod elites;
pub mod movement;
pub mod projectile;
