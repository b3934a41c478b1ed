//! Session configuration and speed presets
//!
//! Supplied once when a session is created; never changed mid-session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_HEIGHT, HEX_WIDTH, START_DISTANCE};

/// Speed presets the game shipped with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    #[default]
    Mobile,
    Desktop,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Mobile => "Mobile",
            Preset::Desktop => "Desktop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mobile" => Some(Preset::Mobile),
            "desktop" => Some(Preset::Desktop),
            _ => None,
        }
    }

    /// Speed and creation-speed modifier for this preset
    pub fn speed_modifiers(&self) -> (f32, f32) {
        match self {
            Preset::Mobile => (0.73, 0.73),
            Preset::Desktop => (0.65, 0.65),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scales fall speed and difficulty growth
    pub speed_modifier: f32,
    /// Scales how quickly the spawn interval shrinks
    pub creation_speed_modifier: f32,
    /// Undeleted blocks a lane may hold before the game ends
    pub row_limit: usize,
    /// Combo window after a reset (seconds)
    pub base_combo_window: f32,
    /// Spawn interval at session start (seconds)
    pub base_spawn_interval: f32,
    /// Spawn interval floor (seconds)
    pub min_spawn_interval: f32,
    /// Upper bound on difficulty
    pub difficulty_cap: f32,
    /// Block colors as RGB; blocks reference them by index
    pub palette: Vec<[u8; 3]>,
    /// Distance from center at which blocks spawn
    pub start_distance: f32,
    /// Hexagon side length; its apothem is the stack floor
    pub hex_width: f32,
    /// Radial height of one block
    pub block_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::Mobile)
    }
}

impl Settings {
    /// Create settings from a speed preset
    pub fn from_preset(preset: Preset) -> Self {
        let (speed_modifier, creation_speed_modifier) = preset.speed_modifiers();
        Self {
            speed_modifier,
            creation_speed_modifier,
            row_limit: 8,
            base_combo_window: 4.0,
            base_spawn_interval: 2.7,
            min_spawn_interval: 0.6,
            difficulty_cap: 35.0,
            palette: vec![[142, 68, 173], [241, 196, 15], [52, 152, 219], [211, 84, 0]],
            start_distance: START_DISTANCE,
            hex_width: HEX_WIDTH,
            block_height: BLOCK_HEIGHT,
        }
    }

    /// Number of colors blocks can take
    pub fn color_count(&self) -> u8 {
        self.palette.len().min(u8::MAX as usize) as u8
    }

    /// Stack floor: distance of a lane's bottom block from the center
    pub fn min_radius(&self) -> f32 {
        crate::hex_apothem(self.hex_width)
    }

    /// True when every value is usable by the simulation
    pub fn is_valid(&self) -> bool {
        let positive = [
            self.speed_modifier,
            self.creation_speed_modifier,
            self.base_combo_window,
            self.base_spawn_interval,
            self.min_spawn_interval,
            self.start_distance,
            self.hex_width,
            self.block_height,
        ];
        positive.iter().all(|v| v.is_finite() && *v > 0.0)
            && self.difficulty_cap >= crate::tuning::START_DIFFICULTY
            && self.min_spawn_interval <= self.base_spawn_interval
            && self.row_limit > 0
            && !self.palette.is_empty()
            && self.palette.len() <= u8::MAX as usize
            && self.start_distance > self.min_radius()
    }

    /// Parse settings from JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) if settings.is_valid() => settings,
            Ok(_) => {
                log::warn!("Settings out of range, using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not parse settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load(_path: &Path) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mobile_preset() {
        let settings = Settings::default();
        assert_eq!(settings, Settings::from_preset(Preset::Mobile));
        assert!(settings.is_valid());
        assert_eq!(settings.color_count(), 4);
    }

    #[test]
    fn test_min_radius_is_hex_apothem() {
        let settings = Settings::default();
        assert!((settings.min_radius() - 75.344_54).abs() < 0.001);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "row_limit": 5 }"#);
        assert_eq!(settings.row_limit, 5);
        assert_eq!(settings.palette.len(), 4);
    }

    #[test]
    fn test_bad_json_falls_back() {
        assert_eq!(Settings::from_json("not json"), Settings::default());
        assert_eq!(
            Settings::from_json(r#"{ "palette": [] }"#),
            Settings::default()
        );
        assert_eq!(
            Settings::from_json(r#"{ "min_spawn_interval": 10.0 }"#),
            Settings::default()
        );
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(Preset::parse("DESKTOP"), Some(Preset::Desktop));
        assert_eq!(Preset::parse("tablet"), None);
        assert_eq!(Preset::Mobile.as_str(), "Mobile");
    }
}
