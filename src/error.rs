//! Error type for the narrow fallible surface of the simulation.
//!
//! Logic errors inside the frame loop (damage to a dead actor, stale
//! handles) are guarded no-ops, not errors; only operations the host
//! explicitly requests can fail, and they report why.

use thiserror::Error;

use crate::components::EliteKind;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("dynamic spawning is frozen until t={0:.1}s")]
    SpawnsFrozen(f32),
    #[error("live actor cap reached")]
    ActorCapReached,
    #[error("elite kind {0:?} is at its soft cap or cooling down")]
    EliteCapReached(EliteKind),
}
