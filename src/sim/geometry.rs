//! Board-space positions for drivers that draw the board
//!
//! Coordinates are logical px with the board center at the origin and y up.
//! Screen direction 0 points 30° above the +x axis; each further direction
//! is another 60° counterclockwise.

use glam::Vec2;

use super::block::Block;
use crate::consts::{LANE_ANGLE_DEG, SIDES};
use crate::polar_to_cartesian;

/// Screen direction of a lane under the current rotation
#[inline]
pub fn screen_direction(lane: usize, rotation: usize) -> usize {
    (SIDES - lane % SIDES + rotation) % SIDES
}

/// Angle (radians) of the middle of a screen direction
#[inline]
pub fn direction_angle(direction: usize) -> f32 {
    (LANE_ANGLE_DEG / 2.0 + LANE_ANGLE_DEG * (direction % SIDES) as f32).to_radians()
}

/// Direction a block is drawn in. Falling blocks keep their spawn
/// direction; blocks in a lane stack turn with the board.
pub fn block_direction(block: &Block, in_lane: bool, rotation: usize) -> usize {
    if in_lane {
        screen_direction(block.attached_lane, rotation)
    } else {
        block.falling_lane
    }
}

/// Center of a block, halfway through its radial extent
pub fn block_center(block: &Block, in_lane: bool, rotation: usize, height: f32) -> Vec2 {
    let theta = direction_angle(block_direction(block, in_lane, rotation));
    polar_to_cartesian(block.distance + height / 2.0, theta)
}

/// Trapezoid corners of a block: inner edge then outer edge, counterclockwise
pub fn block_corners(block: &Block, in_lane: bool, rotation: usize, height: f32) -> [Vec2; 4] {
    let theta = direction_angle(block_direction(block, in_lane, rotation));
    let half = (LANE_ANGLE_DEG / 2.0).to_radians();
    // Hexagon vertices sit further out than the apothem
    let scale = 1.0 / half.cos();
    let inner = block.distance * scale;
    let outer = (block.distance + height) * scale;
    [
        polar_to_cartesian(inner, theta - half),
        polar_to_cartesian(inner, theta + half),
        polar_to_cartesian(outer, theta + half),
        polar_to_cartesian(outer, theta - half),
    ]
}
