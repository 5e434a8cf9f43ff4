//! Spawn director: pressure-driven trickle, periodic waves, and the
//! deterministic elite timetable.
//!
//! Ordinary spawning is budgeted. A pressure rate that grows with elapsed
//! time accrues into a budget each tick, and spawns spend it by size cost.
//! Load (live count, frame time) scales the rate down, never the
//! timetable: elites keep their schedule even when dynamic spawning is
//! disabled, so disabling the trickle cannot silently cancel the threat
//! curve.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{EliteKind, SizeClass};
use crate::constants::*;
use crate::context::SimContext;
use crate::error::SimError;
use crate::events::{EventQueue, GameEvent};
use crate::external::Walkability;
use crate::queries;
use crate::spawning::{self, ActorDef};

/// Unspent budget carried across frames is capped so a long stall cannot
/// release a burst of spawns on recovery.
const BUDGET_CAP: f32 = 12.0;

/// Geometric placement patterns for ordinary spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPattern {
    /// Even ring just outside the safe distance.
    Ring,
    /// Wider ring for flanking pressure.
    WideRing,
    /// Cone ahead of the player's current objective direction.
    Cone,
    /// Uniform ring band at random distance.
    Surge,
}

/// Host-tunable director parameters, loadable from JSON balance data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectorTuning {
    pub pressure_base: f32,
    pub pressure_linear: f32,
    pub pressure_quad: f32,
    pub wave_interval_start: f32,
    pub wave_interval_floor: f32,
    pub wave_interval_shrink: f32,
    pub elite_interval_start: f32,
    pub elite_interval_floor: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            pressure_base: PRESSURE_BASE,
            pressure_linear: PRESSURE_LINEAR,
            pressure_quad: PRESSURE_QUAD,
            wave_interval_start: WAVE_INTERVAL_START,
            wave_interval_floor: WAVE_INTERVAL_FLOOR,
            wave_interval_shrink: WAVE_INTERVAL_SHRINK,
            elite_interval_start: ELITE_INTERVAL_START,
            elite_interval_floor: ELITE_INTERVAL_FLOOR,
        }
    }
}

pub struct Director {
    enabled: bool,
    frozen_until: f32,
    budget: f32,
    wave_next_at: f32,
    wave_interval: f32,
    elites_unlocked_at: Option<f32>,
    elite_schedule: VecDeque<f32>,
    schedule_built_until: f32,
    kind_cooldowns: HashMap<EliteKind, f32>,
    tuning: DirectorTuning,
}

impl Default for Director {
    fn default() -> Self {
        Self::new(DirectorTuning::default())
    }
}

/// Scheduled elite cadence as a function of minutes since unlock: linear
/// shrink from the starting interval to the floor.
pub(crate) fn elite_interval(tuning: &DirectorTuning, minutes_since_unlock: f32) -> f32 {
    let frac = (minutes_since_unlock / ELITE_INTERVAL_SHRINK_MINUTES).clamp(0.0, 1.0);
    tuning.elite_interval_start
        + (tuning.elite_interval_floor - tuning.elite_interval_start) * frac
}

impl Director {
    pub fn new(tuning: DirectorTuning) -> Self {
        Self {
            enabled: true,
            frozen_until: 0.0,
            budget: 0.0,
            wave_next_at: tuning.wave_interval_start,
            wave_interval: tuning.wave_interval_start,
            elites_unlocked_at: None,
            elite_schedule: VecDeque::new(),
            schedule_built_until: 0.0,
            kind_cooldowns: HashMap::new(),
            tuning,
        }
    }

    /// Enable or disable dynamic (pressure and wave) spawning. The elite
    /// timetable is unaffected.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_frozen(&self, now: f32) -> bool {
        now < self.frozen_until
    }

    pub fn frozen_until(&self) -> f32 {
        self.frozen_until
    }

    /// Block all spawning, elites included, for a window. Optionally
    /// discards accrued budget so the backlog does not land on unfreeze.
    pub fn freeze(&mut self, now: f32, duration: f32, clear_backlog: bool, events: &mut EventQueue) {
        self.frozen_until = self.frozen_until.max(now + duration);
        if clear_backlog {
            self.budget = 0.0;
        }
        events.push(GameEvent::SpawnsFrozen {
            until: self.frozen_until,
        });
    }

    pub fn cancel_freeze(&mut self) {
        self.frozen_until = 0.0;
    }

    /// Open the elite timetable. The first scheduled elite lands a fixed
    /// offset after unlock.
    pub fn unlock_elites(&mut self, now: f32) {
        if self.elites_unlocked_at.is_none() {
            self.elites_unlocked_at = Some(now);
            let first = now + ELITE_FIRST_OFFSET;
            self.elite_schedule.push_back(first);
            self.schedule_built_until = first;
        }
    }

    pub fn elites_unlocked(&self) -> bool {
        self.elites_unlocked_at.is_some()
    }

    /// Start the per-kind respawn cooldown after an elite of that kind dies.
    pub fn note_elite_death(&mut self, kind: EliteKind, now: f32) {
        self.kind_cooldowns.insert(kind, now + ELITE_RESPAWN_COOLDOWN);
    }

    /// Run one director step: accrue and spend pressure, fire due waves,
    /// and service the elite timetable.
    pub fn tick(
        &mut self,
        world: &mut World,
        ctx: &SimContext,
        walkability: &dyn Walkability,
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) {
        puffin::profile_function!();

        let now = ctx.now;
        if self.is_frozen(now) {
            // Nothing accrues while frozen; the wave clock shifts with it.
            self.wave_next_at = self.wave_next_at.max(self.frozen_until);
            return;
        }

        self.service_elite_schedule(world, ctx, walkability, rng, events);

        if !self.enabled {
            return;
        }

        let mut live = queries::live_actor_count(world);
        self.budget = (self.budget + self.pressure_rate(ctx, live) * ctx.dt).min(BUDGET_CAP);

        while live < MAX_LIVE_ACTORS {
            let size = pick_size(ctx.minutes(), rng);
            let cost = spawning::spawn_cost(size);
            if self.budget < cost {
                break;
            }
            self.budget -= cost;
            let pattern = random_pattern(rng);
            let pos = self.place(pattern, ctx, rng, walkability);
            let entity = ActorDef::for_size(size).spawn(world, pos);
            events.push(GameEvent::ActorSpawned { entity, size });
            live += 1;
        }

        if now >= self.wave_next_at {
            let mut count = 0;
            for _ in 0..WAVE_BATCH_SIZE {
                if live >= MAX_LIVE_ACTORS {
                    break;
                }
                let size = pick_size(ctx.minutes(), rng);
                let pos = self.place(SpawnPattern::Ring, ctx, rng, walkability);
                let entity = ActorDef::for_size(size).spawn(world, pos);
                events.push(GameEvent::ActorSpawned { entity, size });
                live += 1;
                count += 1;
            }
            events.push(GameEvent::WaveSpawned { count });
            self.wave_interval = (self.wave_interval - self.tuning.wave_interval_shrink)
                .max(self.tuning.wave_interval_floor);
            self.wave_next_at = now + self.wave_interval;
        }
    }

    /// Pressure rate in budget units per second, scaled down by live-actor
    /// load and frame-time shedding.
    fn pressure_rate(&self, ctx: &SimContext, live: usize) -> f32 {
        let m = ctx.minutes();
        let mut rate = self.tuning.pressure_base
            + self.tuning.pressure_linear * m
            + self.tuning.pressure_quad * m * m;
        if live >= LOAD_HARD_THRESHOLD {
            rate *= LOAD_HARD_SCALE;
        } else if live >= LOAD_SOFT_THRESHOLD {
            rate *= LOAD_SOFT_SCALE;
        }
        if ctx.avg_frame_ms > FRAME_TIME_SHED_MS {
            rate *= FRAME_TIME_SHED_SCALE;
        }
        rate
    }

    /// Host-facing ordinary spawn. Subject to freeze windows and the live
    /// cap, but not to the dynamic-spawning toggle.
    pub fn try_spawn(
        &mut self,
        world: &mut World,
        size: SizeClass,
        pattern: SpawnPattern,
        ctx: &SimContext,
        rng: &mut impl Rng,
        walkability: &dyn Walkability,
        events: &mut EventQueue,
    ) -> Result<Entity, SimError> {
        if self.is_frozen(ctx.now) {
            return Err(SimError::SpawnsFrozen(self.frozen_until));
        }
        if queries::live_actor_count(world) >= MAX_LIVE_ACTORS {
            return Err(SimError::ActorCapReached);
        }
        let pos = self.place(pattern, ctx, rng, walkability);
        let entity = ActorDef::for_size(size).spawn(world, pos);
        events.push(GameEvent::ActorSpawned { entity, size });
        Ok(entity)
    }

    /// Host-facing elite spawn. `kind` of `None` picks any kind whose cap
    /// and cooldown allow it.
    pub fn try_spawn_elite(
        &mut self,
        world: &mut World,
        kind: Option<EliteKind>,
        ctx: &SimContext,
        rng: &mut impl Rng,
        walkability: &dyn Walkability,
        events: &mut EventQueue,
    ) -> Result<Entity, SimError> {
        if self.is_frozen(ctx.now) {
            return Err(SimError::SpawnsFrozen(self.frozen_until));
        }
        if queries::living_elites(world).len() >= ELITE_GLOBAL_CAP {
            return Err(SimError::EliteCapReached(kind.unwrap_or(EliteKind::Rusher)));
        }
        let kind = match kind {
            Some(kind) => {
                if !self.kind_allowed(world, kind, ctx.now) {
                    return Err(SimError::EliteCapReached(kind));
                }
                kind
            }
            None => match self.pick_elite_kind(world, ctx.now, rng) {
                Some(kind) => kind,
                None => return Err(SimError::EliteCapReached(EliteKind::Rusher)),
            },
        };

        let pos = self.place_elite(world, ctx, rng, walkability);
        let entity = spawning::spawn_elite(world, kind, pos, ctx.now);
        events.push(GameEvent::EliteSpawned {
            entity,
            kind,
            position: pos,
        });
        log::debug!("elite {kind:?} spawned at {pos:?}");
        Ok(entity)
    }

    /// Force the living elite count up to `desired`, ignoring the
    /// timetable but honoring caps. Returns how many were spawned.
    pub fn ensure_elite_presence(
        &mut self,
        world: &mut World,
        desired: usize,
        ctx: &SimContext,
        rng: &mut impl Rng,
        walkability: &dyn Walkability,
        events: &mut EventQueue,
    ) -> usize {
        let living = queries::living_elites(world).len();
        let missing = desired.saturating_sub(living).min(ENSURE_PRESENCE_MAX);
        let mut spawned = 0;
        for _ in 0..missing {
            if self
                .try_spawn_elite(world, None, ctx, rng, walkability, events)
                .is_err()
            {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Extend the deterministic timetable out to the horizon, then fire
    /// every due entry.
    fn service_elite_schedule(
        &mut self,
        world: &mut World,
        ctx: &SimContext,
        walkability: &dyn Walkability,
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) {
        let Some(unlocked) = self.elites_unlocked_at else {
            return;
        };
        let now = ctx.now;

        while self.schedule_built_until < now + ELITE_SCHEDULE_HORIZON {
            let minutes = ((self.schedule_built_until - unlocked) / 60.0).max(0.0);
            let mut interval = elite_interval(&self.tuning, minutes);
            if ctx.avg_frame_ms > FRAME_TIME_SHED_MS {
                interval *= FRAME_TIME_ELITE_STRETCH;
            }
            let next = self.schedule_built_until + interval;
            self.elite_schedule.push_back(next);
            self.schedule_built_until = next;
        }

        while self.elite_schedule.front().map(|&t| t <= now).unwrap_or(false) {
            self.elite_schedule.pop_front();
            // A blocked slot (caps, cooldowns) is dropped, not queued up.
            let _ = self.try_spawn_elite(world, None, ctx, rng, walkability, events);
        }
    }

    fn kind_allowed(&self, world: &World, kind: EliteKind, now: f32) -> bool {
        if self.kind_cooldowns.get(&kind).map(|&t| now < t).unwrap_or(false) {
            return false;
        }
        let cap = match self.elites_unlocked_at {
            Some(unlocked) if now - unlocked < ELITE_CAP_TIGHT_WINDOW => ELITE_KIND_CAP_EARLY,
            _ => ELITE_KIND_CAP_LATE,
        };
        queries::living_elite_count(world, kind) < cap
    }

    fn pick_elite_kind(&self, world: &World, now: f32, rng: &mut impl Rng) -> Option<EliteKind> {
        let allowed: Vec<EliteKind> = EliteKind::ALL
            .into_iter()
            .filter(|&kind| self.kind_allowed(world, kind, now))
            .collect();
        if allowed.is_empty() {
            None
        } else {
            Some(allowed[rng.gen_range(0..allowed.len())])
        }
    }

    /// Resolve a placement pattern to a walkable point outside the safe
    /// distance.
    fn place(
        &self,
        pattern: SpawnPattern,
        ctx: &SimContext,
        rng: &mut impl Rng,
        walkability: &dyn Walkability,
    ) -> Vec2 {
        let player = ctx.player_pos;
        let raw = match pattern {
            SpawnPattern::Ring => ring_point(player, RING_RADIUS, rng),
            SpawnPattern::WideRing => ring_point(player, WIDE_RING_RADIUS, rng),
            SpawnPattern::Cone => {
                // Oriented at the current objective when one exists,
                // otherwise a random heading.
                let forward = match ctx.chase_override {
                    Some(target) => (target - player).normalize_or_zero(),
                    None => Vec2::ZERO,
                };
                let base = if forward == Vec2::ZERO {
                    rng.gen_range(0.0..std::f32::consts::TAU)
                } else {
                    forward.to_angle()
                };
                let angle = base + rng.gen_range(-CONE_HALF_ANGLE..CONE_HALF_ANGLE);
                player + Vec2::from_angle(angle) * CONE_DISTANCE
            }
            SpawnPattern::Surge => {
                let dist = rng.gen_range(SURGE_MIN_DIST..SURGE_MAX_DIST);
                ring_point(player, dist, rng)
            }
        };
        clamp_outside_safe(walkability.clamp_to_walkable(raw, LARGE_RADIUS), player)
    }

    /// Elite placement: best of several perimeter samples, scored by
    /// distance to the nearest living elite so kinds spread out.
    fn place_elite(
        &self,
        world: &World,
        ctx: &SimContext,
        rng: &mut impl Rng,
        walkability: &dyn Walkability,
    ) -> Vec2 {
        let elites = queries::living_elites(world);
        let mut best = ring_point(ctx.player_pos, RING_RADIUS, rng);
        let mut best_score = f32::MIN;
        for _ in 0..ELITE_PLACEMENT_SAMPLES {
            let candidate = clamp_outside_safe(
                walkability.clamp_to_walkable(ring_point(ctx.player_pos, RING_RADIUS, rng), MEDIUM_RADIUS),
                ctx.player_pos,
            );
            let score = elites
                .iter()
                .map(|(_, _, pos)| candidate.distance(*pos))
                .fold(f32::MAX, f32::min);
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }
        best
    }
}

fn ring_point(center: Vec2, radius: f32, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    center + Vec2::from_angle(angle) * radius
}

/// Push a point back outside the minimum spawn distance if terrain
/// clamping dragged it too close to the player.
fn clamp_outside_safe(pos: Vec2, player: Vec2) -> Vec2 {
    let delta = pos - player;
    let dist = delta.length();
    if dist >= SAFE_MIN_SPAWN_DIST {
        return pos;
    }
    let dir = if dist > 1e-3 { delta / dist } else { Vec2::X };
    player + dir * SAFE_MIN_SPAWN_DIST
}

/// Size mix drifts with elapsed time: smalls always, mediums from the
/// early minutes, larges joining later.
fn pick_size(minutes: f32, rng: &mut impl Rng) -> SizeClass {
    let large_w = ((minutes - 6.0) / 40.0).clamp(0.0, 0.25);
    let medium_w = ((minutes - 2.0) / 16.0).clamp(0.0, 0.45);
    let roll: f32 = rng.gen();
    if roll < large_w {
        SizeClass::Large
    } else if roll < large_w + medium_w {
        SizeClass::Medium
    } else {
        SizeClass::Small
    }
}

fn random_pattern(rng: &mut impl Rng) -> SpawnPattern {
    match rng.gen_range(0..4) {
        0 => SpawnPattern::Ring,
        1 => SpawnPattern::WideRing,
        2 => SpawnPattern::Cone,
        _ => SpawnPattern::Surge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GameMode;
    use crate::external::OpenGround;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ctx_at(now: f32) -> SimContext<'static> {
        SimContext {
            now,
            dt: 1.0 / 60.0,
            player_pos: Vec2::ZERO,
            avg_frame_ms: 16.0,
            low_fx: false,
            mode: GameMode::Standard,
            visibility: None,
            chase_override: None,
        }
    }

    fn run_seconds(director: &mut Director, world: &mut World, start: f32, seconds: f32) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut events = EventQueue::new();
        let dt = 1.0 / 60.0;
        let steps = (seconds / dt) as usize;
        for i in 0..steps {
            let ctx = SimContext {
                now: start + i as f32 * dt,
                ..ctx_at(start)
            };
            director.tick(world, &ctx, &OpenGround, &mut rng, &mut events);
        }
    }

    #[test]
    fn pressure_spawns_more_later_in_the_run() {
        let mut early_world = World::new();
        let mut early = Director::new(DirectorTuning::default());
        run_seconds(&mut early, &mut early_world, 0.0, 10.0);
        let early_count = queries::live_actor_count(&early_world);

        let mut late_world = World::new();
        let mut late = Director::new(DirectorTuning::default());
        run_seconds(&mut late, &mut late_world, 600.0, 10.0);
        let late_count = queries::live_actor_count(&late_world);

        assert!(late_count > early_count * 2, "{early_count} vs {late_count}");
    }

    #[test]
    fn spawns_land_outside_safe_distance() {
        let mut world = World::new();
        let mut director = Director::new(DirectorTuning::default());
        run_seconds(&mut director, &mut world, 0.0, 20.0);

        for snap in queries::active_actors(&world) {
            assert!(snap.position.distance(Vec2::ZERO) >= SAFE_MIN_SPAWN_DIST - 1e-3);
        }
    }

    #[test]
    fn freeze_blocks_host_spawns_with_error() {
        let mut world = World::new();
        let mut director = Director::new(DirectorTuning::default());
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = EventQueue::new();
        let ctx = ctx_at(5.0);

        director.freeze(5.0, 10.0, true, &mut events);
        let err = director
            .try_spawn(
                &mut world,
                SizeClass::Small,
                SpawnPattern::Ring,
                &ctx,
                &mut rng,
                &OpenGround,
                &mut events,
            )
            .unwrap_err();
        assert_eq!(err, SimError::SpawnsFrozen(15.0));

        director.cancel_freeze();
        assert!(director
            .try_spawn(
                &mut world,
                SizeClass::Small,
                SpawnPattern::Ring,
                &ctx,
                &mut rng,
                &OpenGround,
                &mut events,
            )
            .is_ok());
    }

    #[test]
    fn elite_schedule_density_increases_toward_floor() {
        let tuning = DirectorTuning::default();
        assert!((elite_interval(&tuning, 0.0) - ELITE_INTERVAL_START).abs() < 1e-6);
        assert!((elite_interval(&tuning, ELITE_INTERVAL_SHRINK_MINUTES) - ELITE_INTERVAL_FLOOR).abs() < 1e-6);
        assert!(elite_interval(&tuning, 5.0) < elite_interval(&tuning, 1.0));
    }

    #[test]
    fn first_scheduled_elite_lands_at_unlock_plus_offset() {
        let mut world = World::new();
        let mut director = Director::new(DirectorTuning::default());
        director.set_enabled(false);
        director.unlock_elites(30.0);

        // Just before the slot: nothing.
        run_seconds(&mut director, &mut world, 30.0, ELITE_FIRST_OFFSET - 1.0);
        assert_eq!(queries::living_elites(&world).len(), 0);

        // Past it: exactly one.
        run_seconds(&mut director, &mut world, 30.0 + ELITE_FIRST_OFFSET - 1.0, 2.0);
        assert_eq!(queries::living_elites(&world).len(), 1);
    }

    #[test]
    fn kind_cooldown_blocks_requested_respawn() {
        let mut world = World::new();
        let mut director = Director::new(DirectorTuning::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = EventQueue::new();
        let ctx = ctx_at(100.0);

        director.note_elite_death(EliteKind::Lancer, 100.0);
        let err = director
            .try_spawn_elite(
                &mut world,
                Some(EliteKind::Lancer),
                &ctx,
                &mut rng,
                &OpenGround,
                &mut events,
            )
            .unwrap_err();
        assert_eq!(err, SimError::EliteCapReached(EliteKind::Lancer));

        // Another kind is unaffected.
        assert!(director
            .try_spawn_elite(
                &mut world,
                Some(EliteKind::Warden),
                &ctx,
                &mut rng,
                &OpenGround,
                &mut events,
            )
            .is_ok());
    }

    #[test]
    fn tuning_loads_from_json_balance_data() {
        let json = r#"{
            "pressure_base": 0.8,
            "pressure_linear": 0.4,
            "pressure_quad": 0.03,
            "wave_interval_start": 24.0,
            "wave_interval_floor": 8.0,
            "wave_interval_shrink": 2.0,
            "elite_interval_start": 25.0,
            "elite_interval_floor": 6.0
        }"#;
        let tuning: DirectorTuning = serde_json::from_str(json).unwrap();
        assert_eq!(tuning.pressure_base, 0.8);
        assert_eq!(tuning.elite_interval_floor, 6.0);
    }

    #[test]
    fn ensure_presence_tops_up_but_respects_bound() {
        let mut world = World::new();
        let mut director = Director::new(DirectorTuning::default());
        let mut rng = StdRng::seed_from_u64(9);
        let mut events = EventQueue::new();
        let ctx = ctx_at(400.0);
        director.unlock_elites(0.0);

        let spawned =
            director.ensure_elite_presence(&mut world, 6, &ctx, &mut rng, &OpenGround, &mut events);
        assert_eq!(spawned, ENSURE_PRESENCE_MAX);
        assert_eq!(queries::living_elites(&world).len(), ENSURE_PRESENCE_MAX);
    }
}
