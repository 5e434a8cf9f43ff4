//! Real-time enemy simulation core for arena survival runs.
//!
//! The crate owns every hostile in a run: the crowd of ordinary actors,
//! the telegraphed elites, and the singular boss. A host game drives it
//! with [`Simulation::update`] once per frame, feeds it the player's
//! position, applies weapon damage through [`Simulation::apply_damage`],
//! and drains [`GameEvent`]s for rendering, audio, and progression.
//!
//! The crowd lives in a [`hecs`] world behind a uniform spatial grid;
//! generational entity handles make stale references to dead actors
//! harmless. All timed state (effects, elite phases, knockback) is kept
//! as absolute timestamps compared against the frame clock.

pub mod components;
pub mod constants;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod external;
pub mod queries;
pub mod spatial_grid;
pub mod spawning;
pub mod systems;

pub use components::{Boss, EliteKind, ElitePhase, PlayerState, SizeClass};
pub use context::GameMode;
pub use engine::simulation::{BossStatus, Simulation};
pub use error::SimError;
pub use events::{EventQueue, GameEvent};
pub use external::{OpenGround, VisibilityGate, Walkability};
pub use queries::ActorSnapshot;
pub use systems::combat::SourceKind;
pub use systems::director::{DirectorTuning, SpawnPattern};
pub use systems::effects::EffectTuning;
