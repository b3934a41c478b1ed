//! Simulation tick
//!
//! Advances a session by one externally timed step. The order is load
//! bearing: spawns fall in the tick they appear, matching reads freshly
//! settled blocks, and the cascade pass sees gaps opened by cleanup.

use super::collision;
use super::matching::{self, ComboRules};
use super::state::{GameEvent, GamePhase, Simulation};

/// Advance the session by `dt` seconds (already scaled by any speed-up).
///
/// Ignored unless the session is playing and `dt` is a positive number.
pub fn tick(sim: &mut Simulation, dt: f32) {
    if sim.phase != GamePhase::Playing || !(dt.is_finite() && dt > 0.0) {
        return;
    }

    let now = sim.board.elapsed_time;

    // Spawn
    let pattern = sim.director.pattern;
    let spawned = sim.director.update(now, &sim.settings);
    sim.falling.extend(spawned);
    if sim.director.pattern != pattern {
        sim.push_event(GameEvent::PatternChanged {
            pattern: sim.director.pattern,
        });
    }

    // Falling blocks against the stacks
    for lane in collision::advance_falling(&mut sim.board, &mut sim.falling, dt) {
        sim.push_event(GameEvent::BlockSettled { lane });
    }

    // Matching
    let rules = ComboRules {
        base_window: sim.settings.base_combo_window,
        creation_speed_modifier: sim.settings.creation_speed_modifier,
        spawn_interval: sim.director.next_interval,
    };
    for clear in matching::check_pending(&mut sim.board, &rules) {
        sim.score += clear.points;
        if clear.combo > 1 {
            sim.push_event(GameEvent::Combo {
                multiplier: clear.combo,
            });
        }
        sim.push_event(GameEvent::Cleared {
            lane: clear.lane,
            index: clear.index,
            color: clear.color,
            count: clear.count,
            points: clear.points,
            combo: clear.combo,
        });
    }

    // Cleanup of faded blocks
    let removed = matching::sweep_removed(&mut sim.board);
    if removed > 0 {
        for _ in 0..removed {
            sim.director.on_block_destroyed(&sim.settings);
        }
        sim.push_event(GameEvent::BlocksRemoved { count: removed });
    }

    // Cascade
    let cascade_speed = sim.director.cascade_speed(&sim.settings);
    collision::resettle(&mut sim.board, cascade_speed, dt);

    sim.board.elapsed_time += dt;

    if sim.board.is_game_over(sim.settings.row_limit) {
        sim.phase = GamePhase::GameOver;
        log::info!(
            "Game over after {:.1}s with score {}",
            sim.board.elapsed_time,
            sim.score
        );
        sim.push_event(GameEvent::GameOver { score: sim.score });
    }
}
