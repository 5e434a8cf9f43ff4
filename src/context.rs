//! Per-frame simulation context.
//!
//! Everything systems previously would have read from ambient globals
//! (frame-time average, low-fx mode, game mode, visibility) is captured
//! here once per update and passed down explicitly.

use glam::Vec2;

use crate::external::VisibilityGate;

/// Game mode flags that change numeric tuning or enable gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Standard,
    /// Defense mode with fog-of-war visibility gating and chase overrides.
    Siege,
}

/// Frame-cached simulation state passed down through every system call.
pub struct SimContext<'a> {
    /// Current game time in seconds; all timers compare against this.
    pub now: f32,
    /// Frame delta in seconds.
    pub dt: f32,
    pub player_pos: Vec2,
    /// Rolling average frame time in milliseconds, for adaptive throttling.
    pub avg_frame_ms: f32,
    /// Host hint to scale down visual-adjacent per-actor work.
    pub low_fx: bool,
    pub mode: GameMode,
    /// Fog-of-war predicate; only consulted in modes that define one.
    pub visibility: Option<&'a dyn VisibilityGate>,
    /// Defense-objective override: non-aggroed actors chase this instead
    /// of the player.
    pub chase_override: Option<Vec2>,
}

impl SimContext<'_> {
    /// Whether a position is currently visible. Always true outside modes
    /// that define a visibility gate.
    pub fn is_visible(&self, pos: Vec2) -> bool {
        match (self.mode, self.visibility) {
            (GameMode::Siege, Some(gate)) => gate.is_visible(pos),
            _ => true,
        }
    }

    /// Elapsed run time in minutes.
    pub fn minutes(&self) -> f32 {
        self.now / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(mode: GameMode, visibility: Option<&dyn VisibilityGate>) -> SimContext<'_> {
        SimContext {
            now: 0.0,
            dt: 1.0 / 60.0,
            player_pos: Vec2::ZERO,
            avg_frame_ms: 16.0,
            low_fx: false,
            mode,
            visibility,
            chase_override: None,
        }
    }

    #[test]
    fn gate_ignored_outside_siege() {
        let gate = |_pos: Vec2| false;
        let c = ctx(GameMode::Standard, Some(&gate));
        assert!(c.is_visible(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn gate_consulted_in_siege() {
        let gate = |pos: Vec2| pos.x > 0.0;
        let c = ctx(GameMode::Siege, Some(&gate));
        assert!(c.is_visible(Vec2::new(1.0, 0.0)));
        assert!(!c.is_visible(Vec2::new(-1.0, 0.0)));
    }
}
