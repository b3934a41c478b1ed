//! Hexfall - simulation core for a hexagonal falling-block puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, collisions, matching, spawning)
//! - `persistence`: Save/load of a running session
//! - `settings`: Session configuration and speed presets
//! - `tuning`: Empirical balance constants

pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use persistence::{LoadError, SaveState};
pub use settings::{Preset, Settings};
pub use sim::{GameEvent, GamePhase, Simulation, tick};

use glam::Vec2;

/// Board geometry and timing constants
pub mod consts {
    /// Number of lanes (sides of the hexagon)
    pub const SIDES: usize = 6;

    /// Nominal driver rate; one "frame" of the tuned formulas
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// Fixed timestep for a nominal tick
    pub const SIM_DT: f32 = 1.0 / FRAMES_PER_SECOND;

    /// Minimum wall-clock gap between accepted rotations
    pub const ROTATE_DEBOUNCE_MS: f64 = 75.0;

    /// Default hexagon side length (logical px)
    pub const HEX_WIDTH: f32 = 87.0;
    /// Default block radial height (logical px)
    pub const BLOCK_HEIGHT: f32 = 20.0;
    /// Default spawn distance from the board center
    pub const START_DISTANCE: f32 = 227.0;

    /// Degrees of board rotation per lane step
    pub const LANE_ANGLE_DEG: f32 = 360.0 / SIDES as f32;
}

/// Apothem of a regular hexagon: distance from center to the middle of a side
#[inline]
pub fn hex_apothem(side_length: f32) -> f32 {
    side_length / 2.0 * 3.0_f32.sqrt()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
