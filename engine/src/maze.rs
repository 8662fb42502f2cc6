use crate::config::Validate;
use crate::error::{EngineError, FoodPlacementExhausted};
use crate::geometry::{Bounds, Position};
use crate::identifiers::SnakeId;
use crate::session_rng::SessionRng;
use crate::settings::{PlacementPolicy, Settings};

const RANDOM_PICK_ATTEMPTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    Food,
    Snake(SnakeId),
}

/// Occupancy of every cell on the board. Each cell holds exactly one state;
/// the scheduler is the only writer.
#[derive(Clone, Debug)]
pub struct Maze {
    bounds: Bounds,
    cells: Vec<Cell>,
    placement: PlacementPolicy,
    food_count: usize,
}

impl Maze {
    /// Builds the board with its arena border and interior walls. Fails when
    /// walls, snakes and their food cannot all fit without overlapping.
    pub fn initialize(settings: &Settings, snake_count: usize, rng: &mut SessionRng) -> Result<Self, EngineError> {
        settings.validate().map_err(EngineError::InvalidConfiguration)?;

        let bounds = settings.bounds();
        let demand = snake_count
            .checked_mul(settings.initial_snake_length)
            .zip(snake_count.checked_mul(settings.food_per_snake))
            .and_then(|(snakes, food)| snakes.checked_add(food))
            .and_then(|cells| cells.checked_add(settings.walls))
            .and_then(|cells| cells.checked_add(settings.border_cells()))
            .ok_or_else(|| {
                EngineError::InvalidConfiguration("Walls, snakes and food do not fit on any maze".to_string())
            })?;
        if demand > bounds.area() {
            return Err(EngineError::InvalidConfiguration(format!(
                "{} cells needed for walls, snakes and food but the {}x{} maze has {}",
                demand,
                bounds.width,
                bounds.height,
                bounds.area()
            )));
        }

        let mut maze = Self::empty(bounds, settings.placement);
        if settings.arena {
            maze.build_border();
        }
        for _ in 0..settings.walls {
            let Some(position) = maze.pick_free_cell(rng) else {
                return Err(EngineError::InvalidConfiguration("No room left for interior walls".to_string()));
            };
            maze.set(position, Cell::Wall);
        }
        Ok(maze)
    }

    pub fn empty(bounds: Bounds, placement: PlacementPolicy) -> Self {
        Self {
            bounds,
            cells: vec![Cell::Empty; bounds.area()],
            placement,
            food_count: 0,
        }
    }

    fn build_border(&mut self) {
        let (width, height) = (self.bounds.width, self.bounds.height);
        for x in 0..width {
            self.set(Position::new(x, 0), Cell::Wall);
            self.set(Position::new(x, height - 1), Cell::Wall);
        }
        for y in 0..height {
            self.set(Position::new(0, y), Cell::Wall);
            self.set(Position::new(width - 1, y), Cell::Wall);
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_in_bounds(&self, position: Position) -> bool {
        self.bounds.contains(position)
    }

    /// Cells outside the board read as walls.
    pub fn cell_at(&self, position: Position) -> Cell {
        if !self.is_in_bounds(position) {
            return Cell::Wall;
        }
        self.cells[self.bounds.index_of(position)]
    }

    pub fn is_passable(&self, position: Position) -> bool {
        matches!(self.cell_at(position), Cell::Empty | Cell::Food)
    }

    pub fn is_free(&self, position: Position) -> bool {
        self.cell_at(position) == Cell::Empty
    }

    /// Overwrites one cell, keeping the food tally in step.
    pub(crate) fn set(&mut self, position: Position, cell: Cell) {
        let index = self.bounds.index_of(position);
        let previous = std::mem::replace(&mut self.cells[index], cell);
        if previous == Cell::Food {
            self.food_count -= 1;
        }
        if cell == Cell::Food {
            self.food_count += 1;
        }
    }

    pub fn food_count(&self) -> usize {
        self.food_count
    }

    pub fn food_positions(&self) -> Vec<Position> {
        self.positions_matching(Cell::Food)
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Empty).count()
    }

    fn positions_matching(&self, wanted: Cell) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == wanted)
            .map(|(index, _)| self.bounds.position_of(index))
            .collect()
    }

    /// A free cell chosen by the placement policy, or `None` on a full board.
    pub fn pick_free_cell(&self, rng: &mut SessionRng) -> Option<Position> {
        match self.placement {
            PlacementPolicy::Scan => self
                .cells
                .iter()
                .position(|c| *c == Cell::Empty)
                .map(|index| self.bounds.position_of(index)),
            PlacementPolicy::UniformRandom => {
                for _ in 0..RANDOM_PICK_ATTEMPTS {
                    let index = rng.random_range(0..self.cells.len());
                    if self.cells[index] == Cell::Empty {
                        return Some(self.bounds.position_of(index));
                    }
                }
                let free = self.positions_matching(Cell::Empty);
                if free.is_empty() {
                    return None;
                }
                Some(free[rng.random_range(0..free.len())])
            }
        }
    }

    /// Candidate spawn cells in policy order: shuffled for `UniformRandom`,
    /// row-major for `Scan`.
    pub fn free_cells(&self, rng: &mut SessionRng) -> Vec<Position> {
        let mut free = self.positions_matching(Cell::Empty);
        if self.placement == PlacementPolicy::UniformRandom {
            rng.shuffle(&mut free);
        }
        free
    }

    /// Puts `count` pieces of food on free cells. A full board is not fatal:
    /// whatever fits is placed and the shortfall is reported.
    pub fn place_food(&mut self, count: usize, rng: &mut SessionRng) -> Result<usize, FoodPlacementExhausted> {
        for placed in 0..count {
            match self.pick_free_cell(rng) {
                Some(position) => self.set(position, Cell::Food),
                None => {
                    return Err(FoodPlacementExhausted { requested: count, placed });
                }
            }
        }
        Ok(count)
    }

    /// Removes `count` randomly chosen pieces of food.
    pub fn remove_food(&mut self, count: usize, rng: &mut SessionRng) -> usize {
        let mut food = self.food_positions();
        rng.shuffle(&mut food);
        let removed = count.min(food.len());
        for position in food.into_iter().take(removed) {
            self.set(position, Cell::Empty);
        }
        removed
    }

    /// Adds or removes food until the board holds `target` pieces.
    pub fn reconcile_food(&mut self, target: usize, rng: &mut SessionRng) -> Result<(), FoodPlacementExhausted> {
        let current = self.food_count;
        if current < target {
            self.place_food(target - current, rng)?;
        } else if current > target {
            self.remove_food(current - target, rng);
        }
        Ok(())
    }
}
