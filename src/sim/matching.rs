//! Same-color matching, combo scoring and cleanup of removed blocks
//!
//! Blocks connect through four neighbours only: the blocks directly below and
//! above in the same lane, and the blocks at the same index in the two
//! adjacent lanes (wrapping around the hexagon). Diagonals never connect.

use std::collections::HashSet;

use super::block::{BlockColor, Deletion};
use super::board::HexBoard;
use crate::consts::SIDES;
use crate::tuning::COMBO_WINDOW_PER_INTERVAL;

/// Smallest connected group that gets cleared
pub const MIN_MATCH: usize = 3;

/// Inputs to the combo window calculation
#[derive(Debug, Clone, Copy)]
pub struct ComboRules {
    /// Window restored when a combo chain breaks (seconds)
    pub base_window: f32,
    pub creation_speed_modifier: f32,
    /// Current spawn interval (seconds)
    pub spawn_interval: f32,
}

/// A cleared group
#[derive(Debug, Clone, PartialEq)]
pub struct Clear {
    /// Block that triggered the check
    pub lane: usize,
    pub index: usize,
    pub color: BlockColor,
    pub count: usize,
    pub points: u64,
    /// Multiplier applied to this clear
    pub combo: u32,
}

/// Collect the live same-color group containing (lane, index), origin first.
///
/// Returns an empty vec for an empty slot.
pub fn connected_set(board: &HexBoard, lane: usize, index: usize) -> Vec<(usize, usize)> {
    let Some(origin) = board.block(lane, index) else {
        return Vec::new();
    };
    let color = origin.color;

    let mut group = vec![(lane, index)];
    let mut visited: HashSet<(usize, usize)> = HashSet::from([(lane, index)]);
    let mut stack = vec![(lane, index)];

    while let Some((l, i)) = stack.pop() {
        let mut neighbours = Vec::with_capacity(4);
        neighbours.push(((l + SIDES - 1) % SIDES, i));
        neighbours.push(((l + 1) % SIDES, i));
        if i > 0 {
            neighbours.push((l, i - 1));
        }
        neighbours.push((l, i + 1));

        for (nl, ni) in neighbours {
            if visited.contains(&(nl, ni)) {
                continue;
            }
            let Some(block) = board.block(nl, ni) else {
                continue;
            };
            if block.color == color && block.deleted == Deletion::None {
                visited.insert((nl, ni));
                group.push((nl, ni));
                stack.push((nl, ni));
            }
        }
    }

    group
}

/// Check the group around (lane, index); mark and score it if large enough.
pub fn consolidate(
    board: &mut HexBoard,
    lane: usize,
    index: usize,
    rules: &ComboRules,
) -> Option<Clear> {
    let origin = board.block(lane, index)?;
    if !origin.is_live() {
        return None;
    }
    let color = origin.color;

    let group = connected_set(board, lane, index);
    if group.len() < MIN_MATCH {
        return None;
    }

    for &(l, i) in &group {
        if let Some(block) = board.block_mut(l, i) {
            block.mark();
        }
    }

    let now = board.elapsed_time;
    if now - board.last_combo_time < board.combo_window {
        board.combo_multiplier += 1;
        board.combo_window = (1.0 / rules.creation_speed_modifier)
            * rules.spawn_interval
            * COMBO_WINDOW_PER_INTERVAL;
    } else {
        board.combo_multiplier = 1;
        board.combo_window = rules.base_window;
    }
    board.last_combo_time = now;

    let count = group.len();
    let points = (count * count) as u64 * board.combo_multiplier as u64;
    log::debug!(
        "Cleared {} blocks from lane {} index {} (x{}, +{})",
        count,
        lane,
        index,
        board.combo_multiplier,
        points
    );

    Some(Clear {
        lane,
        index,
        color,
        count,
        points,
        combo: board.combo_multiplier,
    })
}

/// Run the match check for every block flagged as needing one.
pub fn check_pending(board: &mut HexBoard, rules: &ComboRules) -> Vec<Clear> {
    let mut clears = Vec::new();
    for lane in 0..SIDES {
        let len = board.lane(lane).map_or(0, Vec::len);
        for index in 0..len {
            let pending = match board.block_mut(lane, index) {
                Some(block) if block.needs_check => {
                    block.needs_check = false;
                    true
                }
                _ => false,
            };
            if pending {
                clears.extend(consolidate(board, lane, index, rules));
            }
        }
    }
    clears
}

/// Mark a matched block's fade as complete. No-op unless it is Marked.
pub fn finish_fade(board: &mut HexBoard, lane: usize, index: usize) -> bool {
    match board.block_mut(lane, index) {
        Some(block) if block.deleted == Deletion::Marked => {
            block.deleted = Deletion::Removed;
            true
        }
        _ => false,
    }
}

/// Splice removed blocks out of their lanes.
///
/// Everything stacked at or above the lowest removed index loses its support
/// and is left unsettled for the cascade pass. Returns the number spliced.
pub fn sweep_removed(board: &mut HexBoard) -> usize {
    let mut removed = 0;
    for lane in 0..SIDES {
        let Some(stack) = board.lane_mut(lane) else {
            continue;
        };
        let Some(lowest) = stack.iter().position(|b| b.deleted == Deletion::Removed) else {
            continue;
        };

        let before = stack.len();
        stack.retain(|b| b.deleted != Deletion::Removed);
        removed += before - stack.len();

        for block in stack.iter_mut().skip(lowest) {
            block.settled = false;
        }
    }
    removed
}
