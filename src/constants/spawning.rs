//! Spawn director pressure, placement, wave, and elite-schedule tuning.

/// Spatial index cell size in world units.
pub const SPATIAL_CELL_SIZE: f32 = 64.0;

/// Pressure budget per second at minute zero.
pub const PRESSURE_BASE: f32 = 0.6;
/// Linear pressure growth per elapsed minute.
pub const PRESSURE_LINEAR: f32 = 0.35;
/// Quadratic pressure growth per elapsed minute squared.
pub const PRESSURE_QUAD: f32 = 0.02;

/// Live-actor count above which pressure is softly reduced.
pub const LOAD_SOFT_THRESHOLD: usize = 400;
/// Live-actor count above which pressure is sharply reduced.
pub const LOAD_HARD_THRESHOLD: usize = 800;
/// Pressure multiplier between the soft and hard thresholds.
pub const LOAD_SOFT_SCALE: f32 = 0.5;
/// Pressure multiplier past the hard threshold.
pub const LOAD_HARD_SCALE: f32 = 0.15;
/// Hard cap on concurrent live hostiles.
pub const MAX_LIVE_ACTORS: usize = 1200;

/// Average frame time (ms) above which the director sheds work.
pub const FRAME_TIME_SHED_MS: f32 = 24.0;
/// Pressure multiplier while frame time is above the shed threshold.
pub const FRAME_TIME_SHED_SCALE: f32 = 0.5;
/// Elite schedule interval stretch factor under heavy frame time.
pub const FRAME_TIME_ELITE_STRETCH: f32 = 1.5;

/// Budget cost of a small spawn.
pub const COST_SMALL: f32 = 1.0;
/// Budget cost of a medium spawn.
pub const COST_MEDIUM: f32 = 3.0;
/// Budget cost of a large spawn.
pub const COST_LARGE: f32 = 7.0;

/// Minimum allowed spawn distance from the player.
pub const SAFE_MIN_SPAWN_DIST: f32 = 420.0;
/// Direct ring placement radius.
pub const RING_RADIUS: f32 = 500.0;
/// Wide ring placement radius.
pub const WIDE_RING_RADIUS: f32 = 720.0;
/// Forward cone placement distance.
pub const CONE_DISTANCE: f32 = 560.0;
/// Forward cone half-angle in radians.
pub const CONE_HALF_ANGLE: f32 = 0.6;
/// Random surge placement distance bounds.
pub const SURGE_MIN_DIST: f32 = 440.0;
pub const SURGE_MAX_DIST: f32 = 820.0;

/// Wave scheduler starting interval in seconds.
pub const WAVE_INTERVAL_START: f32 = 28.0;
/// Wave scheduler interval floor.
pub const WAVE_INTERVAL_FLOOR: f32 = 9.0;
/// Seconds shaved off the wave interval after each wave.
pub const WAVE_INTERVAL_SHRINK: f32 = 1.5;
/// Actors per wave batch.
pub const WAVE_BATCH_SIZE: usize = 10;

/// Delay from elite unlock to the first scheduled elite spawn.
pub const ELITE_FIRST_OFFSET: f32 = 15.0;
/// Starting cadence of the deterministic elite schedule.
pub const ELITE_INTERVAL_START: f32 = 30.0;
/// Floor the elite schedule interval shrinks toward.
pub const ELITE_INTERVAL_FLOOR: f32 = 8.0;
/// Minutes since unlock over which the interval fully shrinks to the floor.
pub const ELITE_INTERVAL_SHRINK_MINUTES: f32 = 18.0;
/// Rolling look-ahead horizon the schedule is regenerated to cover.
pub const ELITE_SCHEDULE_HORIZON: f32 = 120.0;
/// Perimeter candidates sampled when placing an elite.
pub const ELITE_PLACEMENT_SAMPLES: usize = 8;
/// Upper bound on force-spawns from a single ensure-presence call.
pub const ENSURE_PRESENCE_MAX: usize = 4;
