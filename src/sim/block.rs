//! Falling block entity

use serde::{Deserialize, Serialize};

use crate::consts::SIDES;

/// Deletion progress of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Deletion {
    /// Live block
    #[default]
    None,
    /// Matched; the renderer is fading it out
    Marked,
    /// Fade finished; spliced from its lane on the next tick
    Removed,
}

/// Index into the configured color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockColor(pub u8);

/// A single block, falling or stacked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Spawn direction, independent of board rotation
    pub falling_lane: usize,
    pub color: BlockColor,
    /// Distance of the block's inner edge from the board center
    pub distance: f32,
    /// Fall speed (px/s)
    pub speed: f32,
    pub settled: bool,
    /// Lane the block joined; meaningful only once attached
    #[serde(default)]
    pub attached_lane: usize,
    /// Freshly attached or re-settled, awaiting a match check
    #[serde(skip)]
    pub needs_check: bool,
    #[serde(default)]
    pub deleted: Deletion,
}

impl Block {
    /// A new unsettled block. Lanes outside the board wrap around.
    pub fn new(falling_lane: usize, color: BlockColor, speed: f32, distance: f32) -> Self {
        Self {
            falling_lane: falling_lane % SIDES,
            color,
            distance,
            speed,
            settled: false,
            attached_lane: 0,
            needs_check: false,
            deleted: Deletion::None,
        }
    }

    /// Still part of the game (not matched or removed)
    #[inline]
    pub fn is_live(&self) -> bool {
        self.deleted == Deletion::None
    }

    /// Move toward the center by `speed * dt`
    #[inline]
    pub fn fall(&mut self, dt: f32) {
        self.distance = (self.distance - self.speed * dt).max(0.0);
    }

    /// Outer edge of the block, where the next block in the lane rests
    #[inline]
    pub fn top(&self, height: f32) -> f32 {
        self.distance + height
    }

    /// Mark as matched; returns false if it was already deleted
    pub fn mark(&mut self) -> bool {
        if self.deleted == Deletion::None {
            self.deleted = Deletion::Marked;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_wraps_lane() {
        let block = Block::new(7, BlockColor(0), 60.0, 200.0);
        assert_eq!(block.falling_lane, 1);
        assert!(!block.settled);
        assert!(block.is_live());
    }

    #[test]
    fn test_fall_never_negative() {
        let mut block = Block::new(0, BlockColor(0), 600.0, 5.0);
        block.fall(1.0);
        assert_eq!(block.distance, 0.0);
    }

    #[test]
    fn test_mark_only_once() {
        let mut block = Block::new(0, BlockColor(2), 60.0, 100.0);
        assert!(block.mark());
        assert!(!block.mark());
        assert_eq!(block.deleted, Deletion::Marked);
    }
}
