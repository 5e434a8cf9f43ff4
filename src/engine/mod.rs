//! Engine facade wrapping the world, systems, and director behind one
//! host-facing type.

pub mod simulation;
