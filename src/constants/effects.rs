//! Status effect cadences, caps, and slow parameters.

/// Seconds between poison damage ticks.
pub const POISON_TICK_INTERVAL: f32 = 0.5;
/// Seconds between burn damage ticks.
pub const BURN_TICK_INTERVAL: f32 = 0.5;
/// Seconds between mark damage ticks.
pub const MARK_TICK_INTERVAL: f32 = 1.0;
/// Seconds between domination pulse hits on neighbors.
pub const DOMINATION_PULSE_INTERVAL: f32 = 0.8;

/// Poison stack cap (ignored while the evolved-poison tuning flag is set).
pub const POISON_MAX_STACKS: u32 = 5;
/// Burn stack cap.
pub const BURN_MAX_STACKS: u32 = 3;
/// Mark stack cap.
pub const MARK_MAX_STACKS: u32 = 2;

/// Poison duration in seconds, refreshed on reapplication.
pub const POISON_DURATION: f32 = 4.0;
/// Burn duration in seconds, refreshed on reapplication.
pub const BURN_DURATION: f32 = 3.0;
/// Mark duration in seconds, refreshed on reapplication.
pub const MARK_DURATION: f32 = 6.0;

/// Per-stack poison damage applied each tick interval (before multipliers).
pub const POISON_BASE_PER_STACK: f32 = 4.0;
/// Per-stack mark damage applied each tick interval (before multipliers).
pub const MARK_BASE_PER_STACK: f32 = 9.0;

/// Movement slow contributed per poison stack.
pub const POISON_SLOW_PER_STACK: f32 = 0.08;
/// Movement slow contributed by an active mark.
pub const MARK_SLOW: f32 = 0.3;
/// Ceiling on poison-sourced slow, below the global ceiling.
pub const POISON_SLOW_CEILING: f32 = 0.85;
/// Hard ceiling on aggregate slow for anything short of paralysis.
pub const SLOW_CEILING: f32 = 0.97;

/// Radius of the damage pulse emitted by dominated actors.
pub const DOMINATION_PULSE_RADIUS: f32 = 56.0;
/// Damage dealt by each domination pulse to nearby hostiles.
pub const DOMINATION_PULSE_DAMAGE: f32 = 12.0;
/// Search radius when a dominated actor picks a hostile to chase.
pub const DOMINATION_RETARGET_RADIUS: f32 = 480.0;
