//! The hexagonal board: six lane stacks and a rotation position
//!
//! Lanes are indexed independently of rotation. A block falling from
//! direction `f` lands in lane `(SIDES - f + rotation) % SIDES`.

use super::block::{Block, Deletion};
use crate::consts::{ROTATE_DEBOUNCE_MS, SIDES};

/// Board state owned by a running session
#[derive(Debug, Clone)]
pub struct HexBoard {
    /// Rotation position in [0, SIDES)
    rotation: usize,
    /// Lane stacks, index 0 closest to the center
    lanes: [Vec<Block>; SIDES],
    /// Distance of a lane's bottom block from the center
    pub min_radius: f32,
    /// Radial height of every block
    pub block_height: f32,
    pub combo_multiplier: u32,
    /// Current combo window (seconds)
    pub combo_window: f32,
    /// Simulated time of the last match
    pub last_combo_time: f32,
    /// Simulated time accumulator
    pub elapsed_time: f32,
    /// Wall-clock time (ms) of the last accepted rotation
    last_rotate_ms: Option<f64>,
}

impl HexBoard {
    pub fn new(min_radius: f32, block_height: f32, combo_window: f32) -> Self {
        Self {
            rotation: 0,
            lanes: Default::default(),
            min_radius,
            block_height,
            combo_multiplier: 1,
            combo_window,
            // First match can never extend a combo
            last_combo_time: -combo_window,
            elapsed_time: 0.0,
            last_rotate_ms: None,
        }
    }

    #[inline]
    pub fn rotation(&self) -> usize {
        self.rotation
    }

    /// Restore a rotation position; out-of-range values are ignored
    pub fn set_rotation(&mut self, rotation: usize) -> bool {
        if rotation < SIDES {
            self.rotation = rotation;
            true
        } else {
            false
        }
    }

    /// Rotate by one lane step.
    ///
    /// `now_ms` is caller-supplied wall-clock time. Returns false (and does
    /// nothing) for a direction other than ±1 or within the debounce interval.
    pub fn rotate(&mut self, direction: i32, now_ms: f64) -> bool {
        if direction != 1 && direction != -1 {
            return false;
        }
        if self
            .last_rotate_ms
            .is_some_and(|last| now_ms - last < ROTATE_DEBOUNCE_MS)
        {
            return false;
        }
        self.last_rotate_ms = Some(now_ms);
        self.rotation = (self.rotation as i32 + direction).rem_euclid(SIDES as i32) as usize;
        true
    }

    /// Lane a block falling from `falling_lane` lands in at the current rotation
    #[inline]
    pub fn lane_for(&self, falling_lane: usize) -> usize {
        (SIDES - falling_lane % SIDES + self.rotation) % SIDES
    }

    pub fn lanes(&self) -> &[Vec<Block>; SIDES] {
        &self.lanes
    }

    pub fn lane(&self, lane: usize) -> Option<&Vec<Block>> {
        self.lanes.get(lane)
    }

    pub fn lane_mut(&mut self, lane: usize) -> Option<&mut Vec<Block>> {
        self.lanes.get_mut(lane)
    }

    pub fn block(&self, lane: usize, index: usize) -> Option<&Block> {
        self.lanes.get(lane).and_then(|l| l.get(index))
    }

    pub fn block_mut(&mut self, lane: usize, index: usize) -> Option<&mut Block> {
        self.lanes.get_mut(lane).and_then(|l| l.get_mut(index))
    }

    /// Distance at which a block falling into `lane` comes to rest
    pub fn stack_top(&self, lane: usize) -> f32 {
        match self.lanes.get(lane).and_then(|l| l.last()) {
            Some(top) => top.top(self.block_height),
            None => self.min_radius,
        }
    }

    /// Attach a falling block to the stack under its falling direction.
    /// Returns the lane it joined.
    pub fn attach(&mut self, mut block: Block) -> usize {
        let lane = self.lane_for(block.falling_lane);
        let stack = &mut self.lanes[lane];
        block.distance = self.min_radius + self.block_height * stack.len() as f32;
        block.settled = true;
        block.attached_lane = lane;
        block.needs_check = true;
        stack.push(block);
        lane
    }

    /// Blocks in a lane that are not being deleted
    pub fn live_count(&self, lane: usize) -> usize {
        self.lanes
            .get(lane)
            .map(|l| l.iter().filter(|b| b.deleted == Deletion::None).count())
            .unwrap_or(0)
    }

    /// True when any lane holds more live blocks than the row limit
    pub fn is_game_over(&self, row_limit: usize) -> bool {
        (0..SIDES).any(|lane| self.live_count(lane) > row_limit)
    }

    /// Total number of blocks on the board
    pub fn block_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Iterate every stacked block with its (lane, index)
    pub fn iter_blocks(&self) -> impl Iterator<Item = (usize, usize, &Block)> {
        self.lanes
            .iter()
            .enumerate()
            .flat_map(|(lane, stack)| stack.iter().enumerate().map(move |(i, b)| (lane, i, b)))
    }

    /// Replace a lane's contents (used when restoring a save)
    pub(crate) fn set_lane(&mut self, lane: usize, blocks: Vec<Block>) {
        if let Some(slot) = self.lanes.get_mut(lane) {
            *slot = blocks;
        }
    }
}
