//! Save/load of a running session
//!
//! The storage backend is the caller's business; this module only turns a
//! session into versioned JSON and back. Anything that does not validate is
//! rejected with a `LoadError` so the caller can start fresh instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::SIDES;
use crate::settings::Settings;
use crate::sim::{Block, HexBoard, SpawnDirector, state::Simulation};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Why a saved session was rejected
#[derive(Debug)]
pub enum LoadError {
    /// Not valid JSON for a save
    Parse(serde_json::Error),
    /// Written by an incompatible version
    Version(u32),
    /// Wrong number of lanes
    LaneCount(usize),
    /// A block references a color outside the palette
    Color(u8),
    /// A field or the session settings are out of range
    Invalid(&'static str),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "malformed save: {e}"),
            LoadError::Version(v) => write!(f, "unsupported save version {v}"),
            LoadError::LaneCount(n) => write!(f, "expected {SIDES} lanes, found {n}"),
            LoadError::Color(c) => write!(f, "color {c} is not in the palette"),
            LoadError::Invalid(field) => write!(f, "invalid value for {field}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

/// Serialized form of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub seed: u64,
    pub rotation: usize,
    /// Lane stacks, index 0 closest to the center
    pub lanes: Vec<Vec<Block>>,
    #[serde(default)]
    pub falling: Vec<Block>,
    pub elapsed_time: f32,
    pub score: u64,
    pub combo_multiplier: u32,
    pub combo_window: f32,
    pub last_combo_time: f32,
    pub spawn: SpawnDirector,
}

impl SaveState {
    /// Snapshot a session
    pub fn capture(sim: &Simulation) -> Self {
        let board = sim.board();
        Self {
            version: SAVE_VERSION,
            seed: sim.seed,
            rotation: board.rotation(),
            lanes: board.lanes().to_vec(),
            falling: sim.falling.clone(),
            elapsed_time: board.elapsed_time,
            score: sim.score,
            combo_multiplier: board.combo_multiplier,
            combo_window: board.combo_window,
            last_combo_time: board.last_combo_time,
            spawn: sim.director.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every field against the session settings
    pub fn validate(&self, settings: &Settings) -> Result<(), LoadError> {
        if !settings.is_valid() {
            return Err(LoadError::Invalid("settings"));
        }
        if self.version != SAVE_VERSION {
            return Err(LoadError::Version(self.version));
        }
        if self.lanes.len() != SIDES {
            return Err(LoadError::LaneCount(self.lanes.len()));
        }
        if self.rotation >= SIDES {
            return Err(LoadError::Invalid("rotation"));
        }
        if !(self.elapsed_time.is_finite() && self.elapsed_time >= 0.0) {
            return Err(LoadError::Invalid("elapsed_time"));
        }
        if self.combo_multiplier == 0 {
            return Err(LoadError::Invalid("combo_multiplier"));
        }
        if !(self.combo_window.is_finite() && self.combo_window > 0.0) {
            return Err(LoadError::Invalid("combo_window"));
        }
        if !self.last_combo_time.is_finite() {
            return Err(LoadError::Invalid("last_combo_time"));
        }
        if !self.spawn.is_valid(settings) {
            return Err(LoadError::Invalid("spawn"));
        }

        for block in self.lanes.iter().flatten().chain(&self.falling) {
            if block.color.0 >= settings.color_count() {
                return Err(LoadError::Color(block.color.0));
            }
            if block.falling_lane >= SIDES {
                return Err(LoadError::Invalid("falling_lane"));
            }
            if !(block.distance.is_finite() && block.distance >= 0.0) {
                return Err(LoadError::Invalid("distance"));
            }
            if !(block.speed.is_finite() && block.speed >= 0.0) {
                return Err(LoadError::Invalid("speed"));
            }
        }
        if self.falling.iter().any(|b| b.speed == 0.0) {
            return Err(LoadError::Invalid("speed"));
        }
        Ok(())
    }

    /// Rebuild a session. Lane blocks come back unsettled and drop into
    /// place through the cascade pass.
    pub fn into_simulation(self, settings: &Settings) -> Result<Simulation, LoadError> {
        self.validate(settings)?;

        let mut board = HexBoard::new(
            settings.min_radius(),
            settings.block_height,
            settings.base_combo_window,
        );
        board.set_rotation(self.rotation);
        board.elapsed_time = self.elapsed_time;
        board.combo_multiplier = self.combo_multiplier;
        board.combo_window = self.combo_window;
        board.last_combo_time = self.last_combo_time;

        for (lane, mut blocks) in self.lanes.into_iter().enumerate() {
            for block in &mut blocks {
                block.settled = false;
                block.attached_lane = lane;
                block.needs_check = false;
            }
            board.set_lane(lane, blocks);
        }

        let mut falling = self.falling;
        for block in &mut falling {
            block.settled = false;
        }

        Ok(Simulation::from_parts(
            settings.clone(),
            self.seed,
            board,
            self.spawn,
            falling,
            self.score,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{BlockColor, Deletion, tick};

    fn played_session() -> Simulation {
        let mut sim = Simulation::new(Settings::default(), 4242);
        for _ in 0..(60 * 20) {
            tick(&mut sim, SIM_DT);
        }
        sim
    }

    #[test]
    fn test_save_and_restore() {
        let settings = Settings::default();
        let sim = played_session();
        let json = sim.save_json().unwrap();

        let restored = Simulation::restore(settings, Some(&json), 1);
        assert_eq!(restored.seed, sim.seed);
        assert_eq!(restored.score, sim.score);
        assert_eq!(restored.board.rotation(), sim.board.rotation());
        assert_eq!(restored.board.elapsed_time, sim.board.elapsed_time);
        assert_eq!(restored.director.difficulty, sim.director.difficulty);
        assert_eq!(restored.director.pattern, sim.director.pattern);
        assert_eq!(restored.falling.len(), sim.falling.len());
        for lane in 0..SIDES {
            assert_eq!(
                restored.board.lane(lane).unwrap().len(),
                sim.board.lane(lane).unwrap().len()
            );
        }
    }

    #[test]
    fn test_restored_blocks_drop_back_into_place() {
        let mut sim = Simulation::new(Settings::default(), 5);
        sim.board.attach(Block::new(0, BlockColor(0), 60.0, 300.0));
        sim.board.attach(Block::new(0, BlockColor(1), 60.0, 300.0));
        let mut save = SaveState::capture(&sim);
        // Blocks saved mid-air settle back onto the stack
        save.lanes[0][1].distance = 140.0;

        let mut restored = save.into_simulation(&Settings::default()).unwrap();
        assert!(restored.board.iter_blocks().all(|(_, _, b)| !b.settled));
        restored.director.last_production_time = f32::MAX / 4.0;
        for _ in 0..120 {
            tick(&mut restored, SIM_DT);
        }
        let lane = restored.board.lane(0).unwrap();
        assert!(lane.iter().all(|b| b.settled));
        assert_eq!(lane[0].distance, restored.board.min_radius);
        assert!((lane[1].distance - lane[0].top(restored.board.block_height)).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_bad_saves() {
        let settings = Settings::default();
        let sim = Simulation::new(settings.clone(), 3);

        let mut save = SaveState::capture(&sim);
        save.lanes.pop();
        assert!(matches!(save.validate(&settings), Err(LoadError::LaneCount(5))));

        let mut save = SaveState::capture(&sim);
        save.rotation = 6;
        assert!(matches!(save.validate(&settings), Err(LoadError::Invalid("rotation"))));

        let mut save = SaveState::capture(&sim);
        save.lanes[2].push(Block::new(0, BlockColor(9), 60.0, 80.0));
        assert!(matches!(save.validate(&settings), Err(LoadError::Color(9))));

        let mut save = SaveState::capture(&sim);
        save.spawn.difficulty = 99.0;
        assert!(matches!(save.validate(&settings), Err(LoadError::Invalid("spawn"))));

        let no_colors = Settings {
            palette: Vec::new(),
            ..settings.clone()
        };
        let save = SaveState::capture(&sim);
        assert!(matches!(save.validate(&no_colors), Err(LoadError::Invalid("settings"))));
        assert!(save.into_simulation(&no_colors).is_err());

        let mut save = SaveState::capture(&sim);
        save.version = 0;
        assert!(matches!(save.validate(&settings), Err(LoadError::Version(0))));

        assert!(matches!(SaveState::from_json("[]"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_invalid_save_falls_back_to_fresh() {
        let sim = played_session();
        let mut save = SaveState::capture(&sim);
        save.combo_multiplier = 0;
        let json = save.to_json().unwrap();

        let restored = Simulation::restore(Settings::default(), Some(&json), 8);
        assert_eq!(restored.seed, 8);
        assert_eq!(restored.score, 0);
        assert_eq!(restored.board.block_count(), 0);
    }

    #[test]
    fn test_deletion_state_survives() {
        let mut sim = Simulation::new(Settings::default(), 5);
        sim.board.attach(Block::new(0, BlockColor(0), 60.0, 300.0));
        sim.board.block_mut(0, 0).unwrap().deleted = Deletion::Marked;
        let json = sim.save_json().unwrap();
        let restored = Simulation::restore(Settings::default(), Some(&json), 1);
        assert_eq!(restored.board.block(0, 0).unwrap().deleted, Deletion::Marked);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LoadError::LaneCount(4).to_string(),
            "expected 6 lanes, found 4"
        );
        assert_eq!(
            LoadError::Invalid("rotation").to_string(),
            "invalid value for rotation"
        );
    }
}
