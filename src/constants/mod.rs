//! Simulation tuning constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Constants are split into submodules by domain for easier navigation.

mod combat;
mod effects;
mod elites;
mod enemies;
mod spawning;

// Re-export all constants at the module level so call sites can use
// `crate::constants::*` without caring about the split.
pub use combat::*;
pub use effects::*;
pub use elites::*;
pub use enemies::*;
pub use spawning::*;
