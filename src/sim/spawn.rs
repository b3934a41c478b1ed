//! Procedural block spawning and the difficulty curve
//!
//! The director cycles through spawn patterns. Each pattern has its own
//! production cadence (derived from `next_interval`) and block layout; after
//! a bounded number of productions it rolls whether to keep going, switch to
//! another pattern, or fall back to `Random`.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockColor};
use crate::consts::{FRAMES_PER_SECOND, SIDES};
use crate::settings::Settings;
use crate::tuning::*;

/// Spawn strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// One block in a random lane
    Random,
    /// Two neighbouring lanes, independent colors
    Double,
    /// Two opposite lanes, same color
    Crosswise,
    /// One block per production walking around the hexagon
    Spiral,
    /// Every lane at once from a small color set
    Circle,
    /// Three consecutive lanes with matching outer blocks
    HalfCircle,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Random => "random",
            Pattern::Double => "double",
            Pattern::Crosswise => "crosswise",
            Pattern::Spiral => "spiral",
            Pattern::Circle => "circle",
            Pattern::HalfCircle => "half-circle",
        }
    }

    /// Delay between productions for this pattern
    pub fn interval(&self, next_interval: f32) -> f32 {
        match self {
            Pattern::Random | Pattern::Double | Pattern::Crosswise => next_interval,
            Pattern::Spiral => next_interval * 2.0 / 3.0,
            Pattern::Circle => next_interval + CIRCLE_EXTRA_DELAY,
            Pattern::HalfCircle => (next_interval + CIRCLE_EXTRA_DELAY) / 2.0,
        }
    }

    /// Where Random goes once it has run long enough; `roll` is in [0, 24).
    /// The elaborate patterns get the wider slices.
    fn after_random(roll: u32) -> Option<Pattern> {
        match roll {
            16.. => Some(Pattern::Double),
            11..=15 => Some(Pattern::Crosswise),
            8..=10 => Some(Pattern::Spiral),
            5..=7 => Some(Pattern::Circle),
            2..=4 => Some(Pattern::HalfCircle),
            _ => None,
        }
    }

    /// Where Circle goes after each production; `roll` is in [0, 4)
    fn after_circle(roll: u32) -> Pattern {
        match roll {
            0 => Pattern::Double,
            1 => Pattern::Spiral,
            2 => Pattern::Crosswise,
            _ => Pattern::Circle,
        }
    }
}

/// Procedural generator state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnDirector {
    /// In [START_DIFFICULTY, cap]; never decreases
    pub difficulty: f32,
    pub pattern: Pattern,
    /// Weighted productions since the last pattern switch
    pub pattern_count: f32,
    /// Walk direction of the current spiral
    pub spiral_reverse: bool,
    /// Base delay between productions (seconds); never increases
    pub next_interval: f32,
    pub last_production_time: f32,
    last_difficulty_time: f32,
    rng: Pcg32,
}

impl SpawnDirector {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            difficulty: START_DIFFICULTY,
            pattern: Pattern::Random,
            pattern_count: 0.0,
            spiral_reverse: false,
            next_interval: settings.base_spawn_interval,
            last_production_time: 0.0,
            last_difficulty_time: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// True when the restored values fit the given settings
    pub fn is_valid(&self, settings: &Settings) -> bool {
        self.difficulty.is_finite()
            && (START_DIFFICULTY..=settings.difficulty_cap).contains(&self.difficulty)
            && self.next_interval.is_finite()
            && self.next_interval >= settings.min_spawn_interval
            && self.pattern_count.is_finite()
            && self.last_production_time.is_finite()
            && self.last_difficulty_time.is_finite()
    }

    /// Fall speed (px/s) for a pattern's base speed and difficulty slope
    fn speed(&self, base: f32, slope: f32, settings: &Settings) -> f32 {
        (base + self.difficulty / 15.0 * slope) * FRAMES_PER_SECOND * settings.speed_modifier
    }

    /// Speed of a stacked block falling after the blocks below it were removed
    pub fn cascade_speed(&self, settings: &Settings) -> f32 {
        self.speed(SPEED_BASE_CASCADE, SPEED_SLOPE, settings)
    }

    fn random_color(&mut self, settings: &Settings) -> BlockColor {
        BlockColor(self.rng.random_range(0..settings.color_count()))
    }

    fn random_lane(&mut self) -> usize {
        self.rng.random_range(0..SIDES)
    }

    fn switch_to(&mut self, pattern: Pattern) {
        self.pattern_count = 0.0;
        if pattern == Pattern::Spiral {
            self.spiral_reverse = self.rng.random_bool(0.5);
        }
        if pattern != self.pattern {
            log::debug!("Spawn pattern {} -> {}", self.pattern.as_str(), pattern.as_str());
        }
        self.pattern = pattern;
    }

    /// After a patterned production: maybe fall back to Random
    fn maybe_fall_back(&mut self) {
        if self.pattern_count > PATTERN_RUN_LENGTH && self.rng.random_bool(0.5) {
            self.switch_to(Pattern::Random);
        }
    }

    /// Advance to simulated time `now`, returning any newly spawned blocks.
    pub fn update(&mut self, now: f32, settings: &Settings) -> Vec<Block> {
        let mut spawned = Vec::new();
        if now - self.last_production_time > self.pattern.interval(self.next_interval) {
            self.produce(settings, &mut spawned);
            self.last_production_time = now;
        }

        self.compute_difficulty(now, settings);

        let behind = (now - self.last_production_time) * settings.creation_speed_modifier
            > self.next_interval;
        if behind && self.next_interval > settings.min_spawn_interval {
            self.next_interval -=
                self.next_interval * INTERVAL_DECAY * settings.creation_speed_modifier;
            self.next_interval = self.next_interval.max(settings.min_spawn_interval);
        }

        spawned
    }

    /// Emit one production of the current pattern
    fn produce(&mut self, settings: &Settings, out: &mut Vec<Block>) {
        let start = settings.start_distance;
        match self.pattern {
            Pattern::Random => {
                let lane = self.random_lane();
                let color = self.random_color(settings);
                let speed = self.speed(SPEED_BASE_RANDOM, SPEED_SLOPE, settings);
                out.push(Block::new(lane, color, speed, start));

                self.pattern_count += 1.0;
                if self.pattern_count > RANDOM_RUN_LENGTH {
                    let roll = self.rng.random_range(0..24);
                    if let Some(next) = Pattern::after_random(roll) {
                        self.switch_to(next);
                    }
                }
            }
            Pattern::Double => {
                let lane = self.random_lane();
                let speed = self.speed(SPEED_BASE_PATTERN, SPEED_SLOPE, settings);
                for offset in 0..2 {
                    let color = self.random_color(settings);
                    out.push(Block::new((lane + offset) % SIDES, color, speed, start));
                }
                self.pattern_count += 2.0;
                self.maybe_fall_back();
            }
            Pattern::Crosswise => {
                let lane = self.random_lane();
                let color = self.random_color(settings);
                let speed = self.speed(SPEED_BASE_CROSSWISE, SPEED_SLOPE, settings);
                out.push(Block::new(lane, color, speed, start));
                out.push(Block::new((lane + SIDES / 2) % SIDES, color, speed, start));
                self.pattern_count += 1.5;
                self.maybe_fall_back();
            }
            Pattern::Spiral => {
                let step = self.pattern_count as usize % SIDES;
                let lane = if self.spiral_reverse {
                    SIDES - 1 - step
                } else {
                    step
                };
                let color = self.random_color(settings);
                let speed = self.speed(SPEED_BASE_PATTERN, SPEED_SLOPE_SPIRAL, settings);
                out.push(Block::new(lane, color, speed, start));
                self.pattern_count += 1.0;
                self.maybe_fall_back();
            }
            Pattern::Circle => {
                let mut wanted = self.rng.random_range(1..4);
                if wanted == 3 {
                    wanted = self.rng.random_range(1..4);
                }
                let mut colors: Vec<u8> = (0..settings.color_count()).collect();
                colors.shuffle(&mut self.rng);
                colors.truncate(wanted.min(colors.len()));

                let speed = self.speed(SPEED_BASE_PATTERN, SPEED_SLOPE, settings);
                for lane in 0..SIDES {
                    let color = BlockColor(colors[lane % colors.len()]);
                    out.push(Block::new(lane, color, speed, start));
                }

                let roll = self.rng.random_range(0..4);
                self.switch_to(Pattern::after_circle(roll));
            }
            Pattern::HalfCircle => {
                let outer = self.random_color(settings);
                let middle = if self.rng.random_bool(0.5) {
                    self.random_color(settings)
                } else {
                    outer
                };
                let lane = self.random_lane();
                let speed = self.speed(SPEED_BASE_PATTERN, SPEED_SLOPE, settings);
                for (offset, color) in [outer, middle, outer].into_iter().enumerate() {
                    out.push(Block::new((lane + offset) % SIDES, color, speed, start));
                }
                self.pattern_count += 8.0;
                self.maybe_fall_back();
            }
        }
    }

    /// Grow difficulty with elapsed time, slower in each higher band
    fn compute_difficulty(&mut self, now: f32, settings: &Settings) {
        if self.difficulty >= settings.difficulty_cap {
            return;
        }
        let divisor = if self.difficulty < DIFFICULTY_BAND_LOW {
            DIFFICULTY_DIVISOR_LOW
        } else if self.difficulty < DIFFICULTY_BAND_MID {
            DIFFICULTY_DIVISOR_MID
        } else {
            DIFFICULTY_DIVISOR_HIGH
        };
        let elapsed_ms = (now - self.last_difficulty_time).max(0.0) * 1000.0;
        let increment = elapsed_ms / divisor * settings.speed_modifier * DIFFICULTY_DAMPING;
        self.difficulty = (self.difficulty + increment).min(settings.difficulty_cap);
        self.last_difficulty_time = now;
    }

    /// A stacked block was spliced out: speed the game up a notch
    pub fn on_block_destroyed(&mut self, settings: &Settings) {
        let csm = settings.creation_speed_modifier;
        if self.next_interval > INTERVAL_FAST_SHRINK_ABOVE {
            self.next_interval -= INTERVAL_STEP_LARGE * csm;
        } else if self.next_interval > settings.min_spawn_interval {
            self.next_interval -= INTERVAL_STEP_SMALL * csm;
        }
        self.next_interval = self.next_interval.max(settings.min_spawn_interval);

        self.difficulty = (self.difficulty + DIFFICULTY_PER_DESTROYED * settings.speed_modifier)
            .min(settings.difficulty_cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_before_first_interval() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(7, &settings);
        assert!(director.update(1.0, &settings).is_empty());
        assert_eq!(director.update(2.8, &settings).len(), 1);
        assert_eq!(director.last_production_time, 2.8);
    }

    #[test]
    fn test_random_block_shape() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(1, &settings);
        let blocks = director.update(3.0, &settings);
        let block = &blocks[0];
        assert!(block.falling_lane < SIDES);
        assert!(block.color.0 < settings.color_count());
        assert_eq!(block.distance, settings.start_distance);
        let expected = (1.6 + 1.0 / 15.0 * 3.0) * 60.0 * settings.speed_modifier;
        assert!((block.speed - expected).abs() < 1e-3);
    }

    #[test]
    fn test_random_switches_only_after_run() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(3, &settings);
        let mut now = 0.0;
        for _ in 0..5 {
            now += 3.0;
            director.update(now, &settings);
            assert_eq!(director.pattern, Pattern::Random);
        }
    }

    #[test]
    fn test_crosswise_opposite_same_color() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(11, &settings);
        director.switch_to(Pattern::Crosswise);
        let blocks = director.update(3.0, &settings);
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].falling_lane + 3) % SIDES, blocks[1].falling_lane);
        assert_eq!(blocks[0].color, blocks[1].color);
    }

    #[test]
    fn test_double_adjacent_lanes() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(5, &settings);
        director.switch_to(Pattern::Double);
        let blocks = director.update(3.0, &settings);
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].falling_lane + 1) % SIDES, blocks[1].falling_lane);
    }

    #[test]
    fn test_circle_fills_every_lane_with_few_colors() {
        let settings = Settings::default();
        for seed in 0..20 {
            let mut director = SpawnDirector::new(seed, &settings);
            director.switch_to(Pattern::Circle);
            let blocks = director.update(4.0, &settings);
            assert_eq!(blocks.len(), SIDES);
            let lanes: Vec<usize> = blocks.iter().map(|b| b.falling_lane).collect();
            assert_eq!(lanes, (0..SIDES).collect::<Vec<_>>());

            let mut distinct: Vec<u8> = blocks.iter().map(|b| b.color.0).collect();
            distinct.sort();
            distinct.dedup();
            assert!((1..=3).contains(&distinct.len()));
            // Colors repeat cyclically
            let n = distinct.len();
            for i in n..SIDES {
                assert_eq!(blocks[i].color, blocks[i - n].color);
            }
            assert_eq!(director.pattern_count, 0.0);
        }
    }

    #[test]
    fn test_half_circle_outer_colors_match() {
        let settings = Settings::default();
        for seed in 0..20 {
            let mut director = SpawnDirector::new(seed, &settings);
            director.switch_to(Pattern::HalfCircle);
            let blocks = director.update(2.0, &settings);
            assert_eq!(blocks.len(), 3);
            assert_eq!(blocks[0].color, blocks[2].color);
            assert_eq!((blocks[0].falling_lane + 1) % SIDES, blocks[1].falling_lane);
            assert_eq!((blocks[0].falling_lane + 2) % SIDES, blocks[2].falling_lane);
        }
    }

    #[test]
    fn test_spiral_walks_one_direction() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(9, &settings);
        director.switch_to(Pattern::Spiral);
        let reverse = director.spiral_reverse;
        let mut now = 0.0;
        let mut lanes = Vec::new();
        while lanes.len() < 4 && director.pattern == Pattern::Spiral {
            now += 2.0;
            lanes.extend(director.update(now, &settings).iter().map(|b| b.falling_lane));
        }
        let expected: Vec<usize> = (0..lanes.len())
            .map(|i| if reverse { SIDES - 1 - i } else { i })
            .collect();
        assert_eq!(lanes, expected);
    }

    #[test]
    fn test_block_destroyed_bounds() {
        let settings = Settings::default();
        let mut director = SpawnDirector::new(0, &settings);
        for _ in 0..10_000 {
            director.on_block_destroyed(&settings);
        }
        assert_eq!(director.next_interval, settings.min_spawn_interval);
        assert_eq!(director.difficulty, settings.difficulty_cap);
    }

    #[test]
    fn test_difficulty_band_slows_growth() {
        let settings = Settings::default();
        let mut low = SpawnDirector::new(0, &settings);
        let mut high = SpawnDirector::new(0, &settings);
        high.difficulty = 20.0;
        low.compute_difficulty(1000.0, &settings);
        high.compute_difficulty(1000.0, &settings);
        assert!(low.difficulty - 1.0 > high.difficulty - 20.0);
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(Pattern::after_random(23), Some(Pattern::Double));
        assert_eq!(Pattern::after_random(11), Some(Pattern::Crosswise));
        assert_eq!(Pattern::after_random(8), Some(Pattern::Spiral));
        assert_eq!(Pattern::after_random(5), Some(Pattern::Circle));
        assert_eq!(Pattern::after_random(2), Some(Pattern::HalfCircle));
        assert_eq!(Pattern::after_random(1), None);
        assert_eq!(Pattern::after_circle(3), Pattern::Circle);
    }
}
