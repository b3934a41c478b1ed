//! Empirical balance constants
//!
//! These curves were tuned by feel. Times are in seconds, speeds in
//! per-frame units (multiplied by the frame rate when applied).

/// Difficulty at session start
pub const START_DIFFICULTY: f32 = 1.0;

/// Difficulty growth divisors (milliseconds of play per difficulty unit)
/// for the three bands: below 8, 8 to 15, above 15
pub const DIFFICULTY_DIVISOR_LOW: f32 = 5_166_667.0;
pub const DIFFICULTY_DIVISOR_MID: f32 = 72_333_333.0;
pub const DIFFICULTY_DIVISOR_HIGH: f32 = 90_000_000.0;
pub const DIFFICULTY_BAND_LOW: f32 = 8.0;
pub const DIFFICULTY_BAND_MID: f32 = 15.0;
/// Overall damping applied to every band
pub const DIFFICULTY_DAMPING: f32 = 0.5;

/// Difficulty bump per destroyed block (scaled by speed modifier)
pub const DIFFICULTY_PER_DESTROYED: f32 = 0.085;

/// Fraction of the interval shaved off whenever cadence falls behind
pub const INTERVAL_DECAY: f32 = 11.0 / 1300.0;
/// Above this interval, destroyed blocks shave the large step
pub const INTERVAL_FAST_SHRINK_ABOVE: f32 = 1.35;
/// Interval shaved per destroyed block (seconds, scaled by creation modifier)
pub const INTERVAL_STEP_LARGE: f32 = 0.030;
pub const INTERVAL_STEP_SMALL: f32 = 0.008;

/// Extra delay before a Circle production
pub const CIRCLE_EXTRA_DELAY: f32 = 0.5;

/// Productions in Random before a pattern switch is rolled
pub const RANDOM_RUN_LENGTH: f32 = 5.0;
/// Weighted productions in a pattern before falling back is considered
pub const PATTERN_RUN_LENGTH: f32 = 8.0;

/// Base fall speeds (px/frame) and their difficulty slopes
pub const SPEED_BASE_RANDOM: f32 = 1.6;
pub const SPEED_BASE_PATTERN: f32 = 1.5;
pub const SPEED_BASE_CROSSWISE: f32 = 0.6;
/// Speed added per 15 difficulty
pub const SPEED_SLOPE: f32 = 3.0;
pub const SPEED_SLOPE_SPIRAL: f32 = 1.5;

/// Base fall speed of a block cascading after a removal
pub const SPEED_BASE_CASCADE: f32 = 1.5;

/// Combo window shrink factor relative to the spawn interval
pub const COMBO_WINDOW_PER_INTERVAL: f32 = 3.0;
