//! Simulation event system for decoupled communication with the host.
//!
//! Systems emit events, the host consumes them after each update. This lets
//! particles, audio, and UI react without coupling into the simulation; none
//! of it blocks the frame step.

use glam::Vec2;
use hecs::Entity;

use crate::components::{EliteKind, SizeClass};

/// Events emitted during a simulation update.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// Damage landed on an actor (telemetry/UI hit notification).
    HitLanded {
        entity: Entity,
        position: Vec2,
        damage: f32,
        critical: bool,
    },
    /// An actor died; carries the experience reward for the host.
    ActorDied {
        entity: Entity,
        position: Vec2,
        xp: u32,
    },
    /// Lifesteal healed the damage owner.
    OwnerHealed { amount: f32 },
    /// The player took damage (contact, projectile, slash, or beam).
    PlayerHit { damage: f32 },
    /// An elite began telegraphing its attack.
    EliteTelegraph {
        entity: Entity,
        kind: EliteKind,
        position: Vec2,
    },
    /// An elite was spawned.
    EliteSpawned {
        entity: Entity,
        kind: EliteKind,
        position: Vec2,
    },
    /// An ordinary actor was spawned.
    ActorSpawned { entity: Entity, size: SizeClass },
    /// A wave batch was spawned.
    WaveSpawned { count: usize },
    /// An elite projectile detonated with area damage.
    ProjectileExploded { position: Vec2, radius: f32 },
    /// Dynamic spawning was frozen until the given game time.
    SpawnsFrozen { until: f32 },
    /// The boss took damage.
    BossDamaged { damage: f32, remaining: f32 },
    /// The boss died.
    BossDied { position: Vec2 },
}

/// Simple event queue; events are pushed during update and drained by the
/// host at end of frame.
#[derive(Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing.
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Borrow pending events without draining (used by tests).
    pub fn pending(&self) -> &[GameEvent] {
        &self.events
    }
}
