use std::collections::HashMap;

use crate::geometry::{Bounds, Direction, Position};
use crate::identifiers::SnakeId;
use crate::maze::{Cell, Maze};
use crate::snake::{DeathReason, Snake, SnakeState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// Respawning is off and at most one snake is left; `winner` is the
    /// survivor, if any.
    Finished { winner: Option<SnakeId> },
}

/// A cell as observers see it, with snake segments resolved to their index
/// along the body (0 is the head).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Wall,
    Food,
    SnakeSegment { owner: SnakeId, index: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnakeView {
    pub id: SnakeId,
    pub name: String,
    pub body: Vec<Position>,
    pub direction: Option<Direction>,
    pub hunger: Option<u32>,
    pub state: SnakeState,
    pub death_reason: Option<DeathReason>,
    pub score: u32,
    pub deaths: u32,
}

impl SnakeView {
    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }

    pub fn is_alive(&self) -> bool {
        self.state == SnakeState::Alive
    }
}

impl From<&Snake> for SnakeView {
    fn from(snake: &Snake) -> Self {
        Self {
            id: snake.id,
            name: snake.name.clone(),
            body: snake.body.iter().copied().collect(),
            direction: snake.direction,
            hunger: snake.hunger,
            state: snake.state,
            death_reason: snake.death_reason,
            score: snake.score,
            deaths: snake.deaths,
        }
    }
}

/// Immutable picture of the world after a tick. Controllers decide against
/// one and observers receive one; neither ever sees live engine state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tick: u64,
    pub bounds: Bounds,
    pub cells: Vec<Cell>,
    pub snakes: Vec<SnakeView>,
    pub food: Vec<Position>,
    pub status: RunStatus,
    segment_index: HashMap<Position, usize>,
}

impl Snapshot {
    pub fn capture<'a>(
        tick: u64,
        maze: &Maze,
        snakes: impl IntoIterator<Item = &'a Snake>,
        status: RunStatus,
    ) -> Self {
        let snakes: Vec<SnakeView> = snakes.into_iter().map(SnakeView::from).collect();
        let segment_index = snakes
            .iter()
            .filter(|s| s.is_alive())
            .flat_map(|s| s.body.iter().enumerate().map(|(index, p)| (*p, index)))
            .collect();
        Self {
            tick,
            bounds: maze.bounds(),
            cells: maze.cells().to_vec(),
            snakes,
            food: maze.food_positions(),
            status,
            segment_index,
        }
    }

    pub fn cell_at(&self, position: Position) -> CellView {
        if !self.bounds.contains(position) {
            return CellView::Wall;
        }
        match self.cells[self.bounds.index_of(position)] {
            Cell::Empty => CellView::Empty,
            Cell::Wall => CellView::Wall,
            Cell::Food => CellView::Food,
            Cell::Snake(owner) => CellView::SnakeSegment {
                owner,
                index: self.segment_index.get(&position).copied().unwrap_or(0),
            },
        }
    }

    /// True when a head could enter `position` without dying, ignoring the
    /// other snakes' moves this tick.
    pub fn is_passable(&self, position: Position) -> bool {
        matches!(self.cell_at(position), CellView::Empty | CellView::Food)
    }

    pub fn snake(&self, id: SnakeId) -> Option<&SnakeView> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.snakes.iter().filter(|s| s.is_alive()).count()
    }

    /// Scoreboard order: score descending, then fewer deaths, then id.
    pub fn standings(&self) -> Vec<&SnakeView> {
        let mut standings: Vec<&SnakeView> = self.snakes.iter().collect();
        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.deaths.cmp(&b.deaths))
                .then(a.id.cmp(&b.id))
        });
        standings
    }
}
