//! Host-facing simulation facade.
//!
//! Owns the actor world, the spatial index, the director, and the player
//! mirror, and runs the fixed system order each update: rebuild index,
//! director, movement, elites, projectiles, effects, boss DoTs, then
//! compaction. Compaction is the only place actors are despawned, so a
//! handle that was live at the start of an update stays resolvable until
//! that update ends.

use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{
    Barrier, Body, Boss, Elite, Health, Hostile, PlayerState, Position, SlowField, StatusEffects,
};
use crate::context::{GameMode, SimContext};
use crate::error::SimError;
use crate::events::{EventQueue, GameEvent};
use crate::external::{OpenGround, VisibilityGate, Walkability};
use crate::queries::{self, ActorSnapshot};
use crate::spatial_grid::SpatialGrid;
use crate::spawning::{self, ActorDef};
use crate::systems::combat::{self, SourceKind};
use crate::systems::director::{Director, DirectorTuning, SpawnPattern};
use crate::systems::effects::{self, EffectTuning};
use crate::systems::{elites, movement, projectile};
use crate::components::{EliteKind, SizeClass};
use crate::constants::MAX_LIVE_ACTORS;

/// Immutable boss snapshot handed to the host each frame.
#[derive(Debug, Clone, Copy)]
pub struct BossStatus {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub active: bool,
    pub poison_stacks: u32,
    pub burn_stacks: u32,
    pub shredded: bool,
}

macro_rules! frame_ctx {
    ($self:ident, $dt:expr) => {
        SimContext {
            now: $self.game_time,
            dt: $dt,
            player_pos: $self.player.pos,
            avg_frame_ms: $self.avg_frame_ms,
            low_fx: $self.low_fx,
            mode: $self.mode,
            visibility: $self.visibility.as_deref(),
            chase_override: $self.chase_override,
        }
    };
}

pub struct Simulation {
    world: World,
    grid: SpatialGrid,
    director: Director,
    events: EventQueue,
    tuning: EffectTuning,
    player: PlayerState,
    boss: Option<Boss>,
    walkability: Box<dyn Walkability>,
    visibility: Option<Box<dyn VisibilityGate>>,
    mode: GameMode,
    chase_override: Option<Vec2>,
    game_time: f32,
    avg_frame_ms: f32,
    low_fx: bool,
    weapon_level: u32,
    kill_count: u64,
    rng: StdRng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Deterministic construction for replays and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            world: World::new(),
            grid: SpatialGrid::new(),
            director: Director::new(DirectorTuning::default()),
            events: EventQueue::new(),
            tuning: EffectTuning::default(),
            player: PlayerState::new(Vec2::ZERO),
            boss: None,
            walkability: Box::new(OpenGround),
            visibility: None,
            mode: GameMode::Standard,
            chase_override: None,
            game_time: 0.0,
            avg_frame_ms: 16.0,
            low_fx: false,
            weapon_level: 1,
            kill_count: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // =========================================================================
    // Frame step
    // =========================================================================

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        puffin::profile_function!();

        self.game_time += dt;
        let now = self.game_time;

        self.grid.rebuild(&self.world);

        {
            let ctx = frame_ctx!(self, dt);
            self.director
                .tick(&mut self.world, &ctx, self.walkability.as_ref(), &mut self.rng, &mut self.events);
            movement::update(
                &mut self.world,
                &self.grid,
                &ctx,
                self.walkability.as_ref(),
                &mut self.player,
                &mut self.events,
            );
            elites::update(
                &mut self.world,
                &ctx,
                self.walkability.as_ref(),
                &mut self.rng,
                &mut self.player,
                &mut self.events,
            );
            projectile::update(&mut self.world, &ctx, &mut self.player, &mut self.events);
            effects::update(
                &mut self.world,
                &self.grid,
                &ctx,
                &self.tuning,
                &mut self.player,
                &mut self.events,
            );
            if let Some(boss) = self.boss.as_mut() {
                combat::tick_boss_dots(boss, &ctx, &self.tuning, &mut self.player, &mut self.events);
            }
        }

        self.compact(now);
    }

    /// Despawn everything that died or expired this update. The sole
    /// despawn site for actors.
    fn compact(&mut self, now: f32) {
        puffin::profile_function!();

        let dead: Vec<(Entity, Vec2, u32, Option<EliteKind>)> = self
            .world
            .query::<(&Position, &Body, &Health)>()
            .iter()
            .filter(|(_, (_, _, health))| health.is_dead())
            .map(|(entity, (pos, body, _))| {
                let kind = self.world.get::<&Elite>(entity).ok().map(|e| e.kind);
                (entity, pos.0, body.xp_reward, kind)
            })
            .collect();

        for (entity, position, xp, kind) in dead {
            self.events.push(GameEvent::ActorDied {
                entity,
                position,
                xp,
            });
            self.kill_count += 1;
            if let Some(kind) = kind {
                self.director.note_elite_death(kind, now);
            }
            let _ = self.world.despawn(entity);
        }

        let expired: Vec<Entity> = self
            .world
            .query::<&Barrier>()
            .iter()
            .filter(|(_, b)| b.expires_at <= now)
            .map(|(e, _)| e)
            .chain(
                self.world
                    .query::<&SlowField>()
                    .iter()
                    .filter(|(_, f)| f.expires_at <= now)
                    .map(|(e, _)| e),
            )
            .collect();
        for entity in expired {
            let _ = self.world.despawn(entity);
        }
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawn one ordinary actor using a placement pattern.
    pub fn spawn_ordinary(
        &mut self,
        size: SizeClass,
        pattern: SpawnPattern,
    ) -> Result<Entity, SimError> {
        let ctx = frame_ctx!(self, 0.0);
        self.director.try_spawn(
            &mut self.world,
            size,
            pattern,
            &ctx,
            &mut self.rng,
            self.walkability.as_ref(),
            &mut self.events,
        )
    }

    /// Spawn one ordinary actor at an exact host-chosen position.
    pub fn spawn_at(&mut self, size: SizeClass, pos: Vec2) -> Result<Entity, SimError> {
        if self.director.is_frozen(self.game_time) {
            return Err(SimError::SpawnsFrozen(self.director.frozen_until()));
        }
        if queries::live_actor_count(&self.world) >= MAX_LIVE_ACTORS {
            return Err(SimError::ActorCapReached);
        }
        let entity = ActorDef::for_size(size).spawn(&mut self.world, pos);
        self.events.push(GameEvent::ActorSpawned { entity, size });
        Ok(entity)
    }

    /// Spawn an elite via the director's placement. `None` picks any kind
    /// within caps.
    pub fn spawn_elite(&mut self, kind: Option<EliteKind>) -> Result<Entity, SimError> {
        let ctx = frame_ctx!(self, 0.0);
        self.director.try_spawn_elite(
            &mut self.world,
            kind,
            &ctx,
            &mut self.rng,
            self.walkability.as_ref(),
            &mut self.events,
        )
    }

    /// Spawn an elite at an exact host-chosen position, bypassing
    /// placement but not the freeze window.
    pub fn spawn_elite_at(&mut self, kind: EliteKind, pos: Vec2) -> Result<Entity, SimError> {
        if self.director.is_frozen(self.game_time) {
            return Err(SimError::SpawnsFrozen(self.director.frozen_until()));
        }
        let entity = spawning::spawn_elite(&mut self.world, kind, pos, self.game_time);
        self.events.push(GameEvent::EliteSpawned {
            entity,
            kind,
            position: pos,
        });
        Ok(entity)
    }

    /// Open the elite timetable (normally once the run crosses its
    /// difficulty threshold).
    pub fn unlock_elites(&mut self) {
        self.director.unlock_elites(self.game_time);
    }

    /// Force the living elite count up to `desired`; returns how many
    /// spawned.
    pub fn ensure_elite_presence(&mut self, desired: usize) -> usize {
        let ctx = frame_ctx!(self, 0.0);
        self.director.ensure_elite_presence(
            &mut self.world,
            desired,
            &ctx,
            &mut self.rng,
            self.walkability.as_ref(),
            &mut self.events,
        )
    }

    /// Enable or disable dynamic (pressure/wave) spawning. The elite
    /// timetable keeps running.
    pub fn set_dynamic_spawns_enabled(&mut self, enabled: bool) {
        self.director.set_enabled(enabled);
    }

    /// Freeze all spawning for `duration` seconds, discarding the accrued
    /// spawn backlog. With `clear_existing` the live crowd is also removed
    /// silently (no death events, no kill credit) for scripted moments.
    pub fn freeze_spawns(&mut self, duration: f32, clear_existing: bool) {
        self.director
            .freeze(self.game_time, duration, true, &mut self.events);
        if clear_existing {
            let doomed: Vec<Entity> = self
                .world
                .query::<&Hostile>()
                .iter()
                .map(|(e, _)| e)
                .collect();
            for entity in doomed {
                let _ = self.world.despawn(entity);
            }
        }
    }

    pub fn cancel_spawn_freeze(&mut self) {
        self.director.cancel_freeze();
    }

    // =========================================================================
    // Damage and effects
    // =========================================================================

    /// Apply damage to a crowd actor. Returns the damage actually dealt;
    /// zero for dead, despawned, or hidden targets.
    pub fn apply_damage(
        &mut self,
        target: Entity,
        amount: f32,
        critical: bool,
        ignore_active_gate: bool,
        source: SourceKind,
        source_pos: Vec2,
    ) -> f32 {
        let ctx = frame_ctx!(self, 0.0);
        combat::apply_damage(
            &mut self.world,
            target,
            amount,
            critical,
            ignore_active_gate,
            source,
            source_pos,
            self.weapon_level,
            false,
            &ctx,
            &self.tuning,
            &mut self.player,
            &mut self.events,
        )
    }

    /// Area damage around a point; every hit counts as indirect for
    /// lifesteal purposes.
    pub fn area_pulse(&mut self, center: Vec2, radius: f32, amount: f32, source: SourceKind) {
        let targets = queries::actors_in_radius(&self.world, &self.grid, center, radius);
        let ctx = frame_ctx!(self, 0.0);
        for target in targets {
            combat::apply_damage(
                &mut self.world,
                target,
                amount,
                false,
                false,
                source,
                center,
                self.weapon_level,
                true,
                &ctx,
                &self.tuning,
                &mut self.player,
                &mut self.events,
            );
        }
    }

    pub fn apply_poison(&mut self, target: Entity) {
        let now = self.game_time;
        if let Ok(mut fx) = self.world.get::<&mut StatusEffects>(target) {
            effects::apply_poison(&mut fx, now, &self.tuning);
        }
    }

    pub fn apply_mark(&mut self, target: Entity) {
        let now = self.game_time;
        if let Ok(mut fx) = self.world.get::<&mut StatusEffects>(target) {
            effects::apply_mark(&mut fx, now);
        }
    }

    pub fn apply_paralysis(&mut self, target: Entity, duration: f32) {
        let now = self.game_time;
        if let Ok(mut fx) = self.world.get::<&mut StatusEffects>(target) {
            effects::apply_paralysis(&mut fx, now, duration);
        }
    }

    pub fn apply_domination(&mut self, target: Entity, duration: f32) {
        let now = self.game_time;
        if let Ok(mut fx) = self.world.get::<&mut StatusEffects>(target) {
            effects::apply_domination(&mut fx, now, duration);
        }
    }

    /// Teleport an actor, clamped into walkable space.
    pub fn relocate_actor(&mut self, target: Entity, pos: Vec2) {
        let radius = self
            .world
            .get::<&Body>(target)
            .map(|b| b.radius)
            .unwrap_or(0.0);
        let clamped = self.walkability.clamp_to_walkable(pos, radius);
        if let Ok(mut p) = self.world.get::<&mut Position>(target) {
            p.0 = clamped;
        }
    }

    // =========================================================================
    // Boss
    // =========================================================================

    pub fn spawn_boss(&mut self, pos: Vec2, max_hp: f32, radius: f32) {
        self.boss = Some(Boss::new(pos, max_hp, radius));
    }

    pub fn clear_boss(&mut self) {
        self.boss = None;
    }

    pub fn apply_damage_to_boss(
        &mut self,
        amount: f32,
        critical: bool,
        source: SourceKind,
    ) -> f32 {
        let ctx = frame_ctx!(self, 0.0);
        match self.boss.as_mut() {
            Some(boss) => combat::apply_damage_to_boss(
                boss,
                amount,
                critical,
                source,
                self.weapon_level,
                false,
                &ctx,
                &self.tuning,
                &mut self.player,
                &mut self.events,
            ),
            None => 0.0,
        }
    }

    pub fn apply_poison_to_boss(&mut self) {
        let now = self.game_time;
        if let Some(boss) = self.boss.as_mut() {
            combat::apply_poison_to_boss(boss, now, &self.tuning);
        }
    }

    pub fn boss_status(&self) -> Option<BossStatus> {
        self.boss.as_ref().map(|b| BossStatus {
            pos: b.pos,
            hp: b.hp,
            max_hp: b.max_hp,
            active: b.active,
            poison_stacks: b.poison.map(|r| r.stacks).unwrap_or(0),
            burn_stacks: b.burn.map(|r| r.stacks).unwrap_or(0),
            shredded: b.shred_until > self.game_time,
        })
    }

    // =========================================================================
    // Queries and host wiring
    // =========================================================================

    pub fn time(&self) -> f32 {
        self.game_time
    }

    pub fn kill_count(&self) -> u64 {
        self.kill_count
    }

    pub fn live_actor_count(&self) -> usize {
        queries::live_actor_count(&self.world)
    }

    pub fn active_actors(&self) -> Vec<ActorSnapshot> {
        queries::active_actors(&self.world)
    }

    /// Snapshots of live actors overlapping the query circle.
    pub fn actors_in_radius(&self, center: Vec2, radius: f32) -> Vec<ActorSnapshot> {
        queries::actors_in_radius(&self.world, &self.grid, center, radius)
            .into_iter()
            .filter_map(|entity| {
                let pos = self.world.get::<&Position>(entity).ok()?.0;
                let body = self.world.get::<&Body>(entity).ok()?;
                let health = self.world.get::<&Health>(entity).ok()?;
                if health.is_dead() {
                    return None;
                }
                Some(ActorSnapshot {
                    entity,
                    position: pos,
                    radius: body.radius,
                    hp: health.current,
                    max_hp: health.max,
                    elite: self.world.get::<&Elite>(entity).ok().map(|e| e.kind),
                })
            })
            .collect()
    }

    pub fn is_actor_dead(&self, entity: Entity) -> bool {
        queries::is_actor_dead(&self.world, entity)
    }

    pub fn player(&self) -> PlayerState {
        self.player
    }

    /// Sync the authoritative player position from the host.
    pub fn sync_player(&mut self, pos: Vec2) {
        self.player.pos = pos;
    }

    pub fn sync_player_health(&mut self, hp: f32, max_hp: f32) {
        self.player.hp = hp.min(max_hp);
        self.player.max_hp = max_hp;
    }

    pub fn set_effect_tuning(&mut self, tuning: EffectTuning) {
        self.tuning = tuning;
    }

    pub fn set_director_tuning(&mut self, tuning: DirectorTuning) {
        self.director = Director::new(tuning);
    }

    pub fn set_weapon_level(&mut self, level: u32) {
        self.weapon_level = level.max(1);
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn set_walkability(&mut self, walkability: Box<dyn Walkability>) {
        self.walkability = walkability;
    }

    pub fn set_visibility_gate(&mut self, gate: Option<Box<dyn VisibilityGate>>) {
        self.visibility = gate;
    }

    pub fn set_chase_override(&mut self, target: Option<Vec2>) {
        self.chase_override = target;
    }

    /// Host frame-load feedback for adaptive throttling.
    pub fn set_frame_load(&mut self, avg_frame_ms: f32, low_fx: bool) {
        self.avg_frame_ms = avg_frame_ms;
        self.low_fx = low_fx;
    }

    /// Drain events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }
}
