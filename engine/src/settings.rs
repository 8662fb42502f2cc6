use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use crate::geometry::{Bounds, EdgeMode};
use crate::pacing::Speed;

pub const MINIMUM_DIMENSION: usize = 5;
pub const MAXIMUM_DIMENSION: usize = 1000;
pub const MIN_FIELD_SIZE: u32 = 10;
pub const MAX_FIELD_SIZE: u32 = 250;
pub const NORMAL_FIELD_SIZE: u32 = 50;

/// How free cells are chosen for food, interior walls and spawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Uniformly at random among all free cells.
    #[default]
    UniformRandom,
    /// First free cell in row-major order, starting from the bottom-left.
    Scan,
}

/// Configuration of one competition. Everything except `speed` is read once
/// when the simulation starts; speed changes go through
/// [`crate::pacing::SpeedControl`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    /// Pixel size of one field. Only renderers care.
    pub zoom: u32,
    /// Surround the maze with impassable border walls.
    pub arena: bool,
    /// Interior walls, not counting the arena border.
    pub walls: usize,
    pub food_per_snake: usize,
    pub initial_snake_length: usize,
    /// Ticks a snake survives without eating. `None` disables starvation.
    pub max_hunger: Option<u32>,
    pub respawning: bool,
    pub speed: Speed,
    /// Directory the agent roster is discovered from.
    pub source_directory: Option<PathBuf>,
    pub edge_mode: EdgeMode,
    pub placement: PlacementPolicy,
    pub decision_timeout_ms: u64,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            zoom: NORMAL_FIELD_SIZE,
            arena: false,
            walls: 50,
            food_per_snake: 1,
            initial_snake_length: 3,
            max_hunger: Some(400),
            respawning: false,
            speed: Speed::Normal,
            source_directory: None,
            edge_mode: EdgeMode::Death,
            placement: PlacementPolicy::UniformRandom,
            decision_timeout_ms: 100,
            seed: None,
        }
    }
}

impl Settings {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height, self.edge_mode)
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Cells taken by the arena border, zero when there is no arena.
    pub fn border_cells(&self) -> usize {
        if !self.arena {
            return 0;
        }
        2 * self.width + 2 * self.height - 4
    }

    /// Longest straight snake that fits inside the walkable area.
    pub fn longest_straight_line(&self) -> usize {
        let inset = if self.arena { 2 } else { 0 };
        self.width.max(self.height).saturating_sub(inset)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<(), String> {
        let dimensions = MINIMUM_DIMENSION..=MAXIMUM_DIMENSION;
        if !dimensions.contains(&self.width) {
            return Err(format!(
                "Width must be between {} and {}",
                MINIMUM_DIMENSION, MAXIMUM_DIMENSION
            ));
        }
        if !dimensions.contains(&self.height) {
            return Err(format!(
                "Height must be between {} and {}",
                MINIMUM_DIMENSION, MAXIMUM_DIMENSION
            ));
        }
        if !(MIN_FIELD_SIZE..=MAX_FIELD_SIZE).contains(&self.zoom) {
            return Err(format!(
                "Zoom must be between {} and {}",
                MIN_FIELD_SIZE, MAX_FIELD_SIZE
            ));
        }
        if self.initial_snake_length < 1 {
            return Err("Initial snake length must be at least 1".to_string());
        }
        if self.initial_snake_length > self.longest_straight_line() {
            return Err(format!(
                "Initial snake length {} does not fit on a {}x{} maze",
                self.initial_snake_length, self.width, self.height
            ));
        }
        let area = self.width * self.height;
        if self.food_per_snake > area {
            return Err(format!("Food per snake must be at most {} on a {}x{} maze", area, self.width, self.height));
        }
        if self.max_hunger == Some(0) {
            return Err("Max hunger must be at least 1 when set".to_string());
        }
        if self.decision_timeout_ms == 0 {
            return Err("Decision timeout must be at least 1 ms".to_string());
        }
        Ok(())
    }
}
