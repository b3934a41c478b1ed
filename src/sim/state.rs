//! Session state and its command surface
//!
//! Everything a running game needs lives in `Simulation`; there is no global
//! state. Drivers call `tick` at their frame rate and read state back out.

use serde::{Deserialize, Serialize};

use super::block::{Block, BlockColor, Deletion};
use super::board::HexBoard;
use super::matching;
use super::spawn::{Pattern, SpawnDirector};
use crate::persistence::SaveState;
use crate::settings::Settings;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Ticks are ignored; rotation is still accepted
    Paused,
    /// A lane overflowed
    GameOver,
}

/// Something that happened during a tick, for overlays and audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A falling block joined a lane stack
    BlockSettled { lane: usize },
    /// A same-color group was matched
    Cleared {
        lane: usize,
        index: usize,
        color: BlockColor,
        count: usize,
        points: u64,
        combo: u32,
    },
    /// A match extended the combo chain
    Combo { multiplier: u32 },
    /// Faded blocks were spliced from the board
    BlocksRemoved { count: usize },
    /// The spawn director switched strategy
    PatternChanged { pattern: Pattern },
    Rotated { rotation: usize },
    GameOver { score: u64 },
}

/// A running session
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) settings: Settings,
    /// Seed of the spawn RNG
    pub seed: u64,
    pub board: HexBoard,
    pub director: SpawnDirector,
    /// Blocks not yet attached to a lane
    pub falling: Vec<Block>,
    pub score: u64,
    pub phase: GamePhase,
    events: Vec<GameEvent>,
}

impl Simulation {
    /// Start a fresh session. Invalid settings are replaced by defaults.
    pub fn new(settings: Settings, seed: u64) -> Self {
        let settings = usable_settings(settings);
        log::info!("New session with seed {}", seed);

        Self {
            board: HexBoard::new(
                settings.min_radius(),
                settings.block_height,
                settings.base_combo_window,
            ),
            director: SpawnDirector::new(seed, &settings),
            falling: Vec::new(),
            score: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            seed,
            settings,
        }
    }

    /// Resume from saved JSON, or start fresh when it is missing or unusable
    pub fn restore(settings: Settings, saved: Option<&str>, fallback_seed: u64) -> Self {
        let settings = usable_settings(settings);
        let Some(json) = saved else {
            return Self::new(settings, fallback_seed);
        };
        match SaveState::from_json(json).and_then(|save| save.into_simulation(&settings)) {
            Ok(sim) => {
                log::info!("Restored session (score {})", sim.score);
                sim
            }
            Err(e) => {
                log::warn!("Discarding saved session: {}", e);
                Self::new(settings, fallback_seed)
            }
        }
    }

    /// Replace this session with a fresh or restored one
    pub fn reset(&mut self, saved: Option<&str>) {
        let seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        *self = Self::restore(self.settings.clone(), saved, seed);
    }

    /// Assemble a session from already-validated parts
    pub(crate) fn from_parts(
        settings: Settings,
        seed: u64,
        board: HexBoard,
        director: SpawnDirector,
        falling: Vec<Block>,
        score: u64,
    ) -> Self {
        Self {
            settings,
            seed,
            board,
            director,
            falling,
            score,
            phase: GamePhase::Playing,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn board(&self) -> &HexBoard {
        &self.board
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Rotate the board by ±1 lane. `now_ms` is wall-clock time from the
    /// driver. Only accepted while playing or paused.
    pub fn rotate(&mut self, direction: i32, now_ms: f64) -> bool {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        let accepted = self.board.rotate(direction, now_ms);
        if accepted {
            self.push_event(GameEvent::Rotated {
                rotation: self.board.rotation(),
            });
        }
        accepted
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Report that the fade of a matched block finished. It is spliced out on
    /// the next tick. No-op for empty slots or unmatched blocks.
    pub fn remove_block(&mut self, lane: usize, index: usize) -> bool {
        matching::finish_fade(&mut self.board, lane, index)
    }

    /// Finish every pending fade at once (drivers without fade animation)
    pub fn complete_fades(&mut self) -> usize {
        let marked: Vec<(usize, usize)> = self
            .board
            .iter_blocks()
            .filter(|(_, _, b)| b.deleted == Deletion::Marked)
            .map(|(lane, index, _)| (lane, index))
            .collect();
        marked
            .into_iter()
            .filter(|&(lane, index)| self.remove_block(lane, index))
            .count()
    }

    /// Serialize the session for an external store
    pub fn save_json(&self) -> serde_json::Result<String> {
        SaveState::capture(self).to_json()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn usable_settings(settings: Settings) -> Settings {
    if settings.is_valid() {
        settings
    } else {
        log::warn!("Invalid settings, using defaults");
        Settings::default()
    }
}
