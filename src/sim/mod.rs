//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Externally supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (lane by lane, center outward)
//! - No rendering or platform dependencies

pub mod block;
pub mod board;
pub mod collision;
pub mod geometry;
pub mod matching;
pub mod spawn;
pub mod state;
pub mod tick;

pub use block::{Block, BlockColor, Deletion};
pub use board::HexBoard;
pub use matching::{Clear, ComboRules};
pub use spawn::{Pattern, SpawnDirector};
pub use state::{GameEvent, GamePhase, Simulation};
pub use tick::tick;
