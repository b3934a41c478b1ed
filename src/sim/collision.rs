//! Collision and settling of blocks against lane stacks
//!
//! Two passes run each tick: falling blocks against the top of their target
//! lane, then unsettled lane blocks (opened up by removals) against whatever
//! is now beneath them. Reaching a boundary exactly counts as landing.

use super::block::Block;
use super::board::HexBoard;
use crate::consts::SIDES;

/// Advance free-falling blocks, attaching those that reach their lane's stack.
///
/// Returns the lanes blocks were attached to, in attach order.
pub fn advance_falling(board: &mut HexBoard, falling: &mut Vec<Block>, dt: f32) -> Vec<usize> {
    let mut landed = Vec::new();
    let mut airborne = Vec::with_capacity(falling.len());

    for mut block in falling.drain(..) {
        let lane = board.lane_for(block.falling_lane);
        let boundary = board.stack_top(lane);

        if block.distance - block.speed * dt - boundary <= 0.0 {
            block.distance = boundary;
            landed.push(board.attach(block));
        } else {
            block.fall(dt);
            airborne.push(block);
        }
    }

    *falling = airborne;
    landed
}

/// Let unsettled lane blocks drop onto the block below (or the board).
///
/// Lanes are walked from the center outward so a block can land on a
/// neighbour that re-settled earlier in the same pass. A block only lands on a
/// neighbour that is itself settled. Falling blocks move at `cascade_speed`.
/// Returns how many blocks settled.
pub fn resettle(board: &mut HexBoard, cascade_speed: f32, dt: f32) -> usize {
    let min_radius = board.min_radius;
    let height = board.block_height;
    let mut settled = 0;

    for lane in 0..SIDES {
        let Some(stack) = board.lane_mut(lane) else {
            continue;
        };

        for index in 0..stack.len() {
            if stack[index].settled {
                continue;
            }

            let (floor, below_top) = if index == 0 {
                (Some(min_radius), min_radius)
            } else {
                let below = &stack[index - 1];
                let top = below.top(height);
                (below.settled.then_some(top), top)
            };

            let block = &mut stack[index];
            match floor {
                Some(floor) if block.distance - block.speed * dt - floor <= 0.0 => {
                    block.distance = floor;
                    block.settled = true;
                    block.attached_lane = lane;
                    block.needs_check = true;
                    settled += 1;
                }
                _ => {
                    block.speed = cascade_speed;
                    // Never sink into the block below, even while it is still moving
                    block.distance = (block.distance - block.speed * dt).max(below_top);
                }
            }
        }
    }

    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::{BlockColor, Deletion};

    const DT: f32 = 1.0 / 60.0;

    fn board() -> HexBoard {
        HexBoard::new(75.0, 20.0, 4.0)
    }

    #[test]
    fn test_falling_block_settles_on_empty_lane() {
        let mut board = board();
        let mut falling = vec![Block::new(0, BlockColor(0), 600.0, 100.0)];

        let mut landed = Vec::new();
        for _ in 0..10 {
            landed.extend(advance_falling(&mut board, &mut falling, DT));
        }

        assert!(falling.is_empty());
        assert_eq!(landed, vec![0]);
        let block = board.block(0, 0).unwrap();
        assert_eq!(block.distance, 75.0);
        assert_eq!(block.attached_lane, 0);
    }

    #[test]
    fn test_falling_block_moves_full_step_when_clear() {
        let mut board = board();
        let mut falling = vec![Block::new(3, BlockColor(0), 60.0, 200.0)];
        let landed = advance_falling(&mut board, &mut falling, DT);
        assert!(landed.is_empty());
        assert!((falling[0].distance - 199.0).abs() < 1e-4);
    }

    #[test]
    fn test_exact_boundary_settles() {
        let mut board = board();
        // Exactly one step above the floor
        let mut falling = vec![Block::new(0, BlockColor(0), 2.0, 76.0)];
        let landed = advance_falling(&mut board, &mut falling, 0.5);
        assert_eq!(landed.len(), 1);
        assert_eq!(board.block(0, 0).unwrap().distance, 75.0);
    }

    #[test]
    fn test_lands_on_existing_stack() {
        let mut board = board();
        board.attach(Block::new(0, BlockColor(0), 60.0, 75.0));
        // Within one step of the stack top
        let mut falling = vec![Block::new(0, BlockColor(1), 6000.0, 150.0)];
        let landed = advance_falling(&mut board, &mut falling, DT);
        assert_eq!(landed, vec![0]);
        assert!(falling.is_empty());
        assert_eq!(board.lane(0).unwrap().len(), 2);
        assert_eq!(board.block(0, 1).unwrap().distance, 95.0);
    }

    #[test]
    fn test_resettle_cascades_after_removal() {
        let mut board = board();
        for color in 0..3 {
            board.attach(Block::new(0, BlockColor(color), 60.0, 300.0));
        }
        // Bottom block fades out and is spliced; upper blocks lose their support
        let stack = board.lane_mut(0).unwrap();
        stack[0].deleted = Deletion::Removed;
        stack.remove(0);
        for block in stack.iter_mut() {
            block.settled = false;
            block.needs_check = false;
        }

        for _ in 0..120 {
            resettle(&mut board, 120.0, DT);
        }

        let stack = board.lane(0).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].distance, 75.0);
        assert_eq!(stack[1].distance, 95.0);
        assert!(stack.iter().all(|b| b.settled && b.needs_check));
    }

    #[test]
    fn test_resettle_waits_for_unsettled_neighbour() {
        let mut board = board();
        board.attach(Block::new(0, BlockColor(0), 60.0, 300.0));
        board.attach(Block::new(0, BlockColor(1), 60.0, 300.0));
        let stack = board.lane_mut(0).unwrap();
        stack[0].distance = 200.0;
        stack[0].settled = false;
        stack[1].distance = 220.0;
        stack[1].settled = false;

        resettle(&mut board, 60.0, DT);
        let stack = board.lane(0).unwrap();
        assert!(!stack[0].settled);
        assert!(!stack[1].settled);
        assert!(stack[1].distance >= stack[0].top(20.0));
    }
}
