use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::broadcast;

use crate::controller::{ControllerHandle, ControllerView, DEFAULT_DIRECTION, Entrant};
use crate::error::{ControllerError, EngineError};
use crate::geometry::{Bounds, Direction, EdgeMode, Position};
use crate::identifiers::SnakeId;
use crate::log;
use crate::maze::{Cell, Maze};
use crate::session_rng::SessionRng;
use crate::settings::Settings;
use crate::snake::{DeathReason, Snake, SnakeState};
use crate::snapshot::{RunStatus, Snapshot};

/// Snapshots kept for a lagging observer before the oldest are dropped.
const OBSERVER_BUFFER: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickEvent {
    Ate { snake: SnakeId, at: Position },
    Died { snake: SnakeId, reason: DeathReason },
    Respawned { snake: SnakeId, at: Position },
    Removed { snake: SnakeId },
    /// The controller gave no usable answer and `direction` was used instead.
    Fallback { snake: SnakeId, error: ControllerError, direction: Direction },
    /// Not enough free cells for the food target; retried next tick.
    FoodShortage { missing: usize },
}

#[derive(Clone, Debug)]
pub struct TickReport {
    pub tick: u64,
    pub status: RunStatus,
    pub events: Vec<TickEvent>,
}

struct Competitor {
    snake: Snake,
    controller: ControllerHandle,
}

struct PlannedMove {
    index: usize,
    direction: Direction,
    target: Option<Position>,
    grows: bool,
}

/// The competition engine. Owns the maze and every snake; advances the world
/// one tick at a time and hands out immutable snapshots.
pub struct Simulation {
    settings: Settings,
    maze: Maze,
    competitors: Vec<Competitor>,
    rng: SessionRng,
    tick: u64,
    initial_count: usize,
    status: RunStatus,
    snapshot: Arc<Snapshot>,
    observers: broadcast::Sender<Arc<Snapshot>>,
}

impl Simulation {
    /// Builds the maze, places every entrant and the initial food. Entrants
    /// get ids 1, 2, ... in the order given.
    pub fn new(settings: Settings, entrants: Vec<Entrant>) -> Result<Self, EngineError> {
        let mut rng = SessionRng::from_optional_seed(settings.seed);
        let maze = Maze::initialize(&settings, entrants.len(), &mut rng)?;
        let (observers, _) = broadcast::channel(OBSERVER_BUFFER);
        let initial_count = entrants.len();

        let mut simulation = Self {
            snapshot: Arc::new(Snapshot::capture(0, &maze, [], RunStatus::Running)),
            settings,
            maze,
            competitors: Vec::with_capacity(entrants.len()),
            rng,
            tick: 0,
            initial_count,
            status: RunStatus::Running,
            observers,
        };

        let mut unplaced = Vec::new();
        for (index, entrant) in entrants.into_iter().enumerate() {
            let id = SnakeId::new(index as u32 + 1);
            let mut competitor = Competitor {
                snake: Snake::new(id, entrant.name),
                controller: ControllerHandle::new(entrant.controller),
            };
            match entrant.start {
                Some(body) => {
                    simulation.check_start(&competitor.snake, &body)?;
                    place(&mut simulation.maze, &mut competitor.snake, body, simulation.settings.max_hunger);
                }
                None => unplaced.push(index),
            }
            simulation.competitors.push(competitor);
        }

        for index in unplaced {
            let Some(body) = simulation.find_spawn() else {
                return Err(EngineError::InvalidConfiguration(format!(
                    "No free straight line of {} cells for snake {}",
                    simulation.settings.initial_snake_length,
                    simulation.competitors[index].snake.id
                )));
            };
            place(
                &mut simulation.maze,
                &mut simulation.competitors[index].snake,
                body,
                simulation.settings.max_hunger,
            );
        }

        let mut events = Vec::new();
        simulation.replenish_food(&mut events);
        simulation.status = simulation.evaluate_status();
        simulation.snapshot = Arc::new(simulation.capture());

        log!(
            "Simulation ready: {}x{} maze, {} snakes, seed {}",
            simulation.settings.width,
            simulation.settings.height,
            simulation.competitors.len(),
            simulation.rng.seed()
        );
        Ok(simulation)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        self.competitors.iter().map(|c| &c.snake)
    }

    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes().find(|s| s.id == id)
    }

    /// The snapshot published after the latest tick.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Receives every snapshot from now on. A receiver that falls more than a
    /// few ticks behind loses the oldest ones; the tick loop never waits.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.observers.subscribe()
    }

    pub fn target_food(&self) -> usize {
        self.settings.food_per_snake.saturating_mul(self.alive_count())
    }

    fn alive_count(&self) -> usize {
        self.snakes().filter(|s| s.is_alive()).count()
    }

    /// Advances the world by exactly one tick. Stepping a finished simulation
    /// is allowed; whether "finished" ends the run is up to the caller.
    pub async fn step(&mut self) -> TickReport {
        let mut events = Vec::new();
        let was_running = self.status == RunStatus::Running;

        self.advance_lifecycle(&mut events);
        let view = Arc::new(self.capture());
        let decisions = self.collect_decisions(view, &mut events).await;
        self.resolve_moves(decisions, &mut events);
        self.replenish_food(&mut events);

        self.tick += 1;
        self.status = self.evaluate_status();
        self.snapshot = Arc::new(self.capture());
        // No subscribers is fine.
        let _ = self.observers.send(Arc::clone(&self.snapshot));

        for event in &events {
            self.log_event(event);
        }
        if let RunStatus::Finished { winner } = self.status
            && was_running
        {
            match winner.and_then(|id| self.snake(id)) {
                Some(snake) => log!("[tick {}] {} ({}) is the last snake standing", self.tick, snake.name, snake.id),
                None => log!("[tick {}] No snake survived", self.tick),
            }
        }

        TickReport {
            tick: self.tick,
            status: self.status,
            events,
        }
    }

    /// Dead snakes leave the board for good or queue for a respawn; queued
    /// snakes re-enter wherever a free line is found.
    fn advance_lifecycle(&mut self, events: &mut Vec<TickEvent>) {
        let respawning = self.settings.respawning;
        for competitor in &mut self.competitors {
            if competitor.snake.state == SnakeState::Dead {
                competitor.snake.retire(respawning);
                if competitor.snake.state == SnakeState::Removed {
                    events.push(TickEvent::Removed { snake: competitor.snake.id });
                }
            }
        }

        for index in 0..self.competitors.len() {
            if self.competitors[index].snake.state != SnakeState::RespawnPending {
                continue;
            }
            let Some(body) = self.find_spawn() else {
                continue;
            };
            let at = body[0];
            let snake = &mut self.competitors[index].snake;
            place(&mut self.maze, snake, body, self.settings.max_hunger);
            events.push(TickEvent::Respawned { snake: snake.id, at });
        }
    }

    async fn collect_decisions(&self, view: Arc<Snapshot>, events: &mut Vec<TickEvent>) -> Vec<(usize, Direction)> {
        let budget = self.settings.decision_timeout();
        let pending: Vec<(usize, SnakeId, Option<Direction>, &ControllerHandle)> = self
            .competitors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.snake.is_alive())
            .map(|(index, c)| (index, c.snake.id, c.snake.direction, &c.controller))
            .collect();

        let requests = pending.iter().map(|(_, id, _, controller)| {
            controller.request_decision(ControllerView::new(Arc::clone(&view), *id), budget)
        });
        let answers = join_all(requests).await;

        pending
            .into_iter()
            .zip(answers)
            .map(|((index, id, last, _), answer)| {
                let direction = match answer {
                    Ok(direction) => direction,
                    Err(error) => {
                        let direction = last.unwrap_or(DEFAULT_DIRECTION);
                        events.push(TickEvent::Fallback { snake: id, error, direction });
                        direction
                    }
                };
                (index, direction)
            })
            .collect()
    }

    /// Moves every deciding snake. Tails that are about to move away are
    /// freed first, then heads claim cells in ascending id order: a head that
    /// meets a wall, any snake cell or a cell claimed earlier this tick dies.
    /// A single segment is both head and tail, so its cell stays taken until
    /// the snake has moved; two such snakes cannot pass through each other.
    fn resolve_moves(&mut self, decisions: Vec<(usize, Direction)>, events: &mut Vec<TickEvent>) {
        let bounds = self.maze.bounds();
        let planned: Vec<PlannedMove> = decisions
            .into_iter()
            .filter_map(|(index, direction)| {
                let head = self.competitors[index].snake.head()?;
                let target = bounds.step(head, direction);
                let grows = target.is_some_and(|t| self.maze.cell_at(t) == Cell::Food);
                Some(PlannedMove { index, direction, target, grows })
            })
            .collect();

        for planned_move in planned.iter().filter(|m| !m.grows) {
            let snake = &self.competitors[planned_move.index].snake;
            if snake.len() > 1
                && let Some(tail) = snake.tail()
                && self.maze.cell_at(tail) == Cell::Snake(snake.id)
            {
                self.maze.set(tail, Cell::Empty);
            }
        }

        let max_hunger = self.settings.max_hunger;
        let mut died = Vec::new();
        for planned_move in planned {
            let snake = &mut self.competitors[planned_move.index].snake;
            let outcome = match planned_move.target {
                None => Err(DeathReason::OutOfBounds),
                Some(target) => match self.maze.cell_at(target) {
                    Cell::Wall => Err(DeathReason::WallCollision),
                    Cell::Snake(owner) if owner == snake.id => Err(DeathReason::SelfCollision),
                    Cell::Snake(_) => Err(DeathReason::SnakeCollision),
                    Cell::Empty | Cell::Food => Ok(target),
                },
            };

            match outcome {
                Ok(target) => {
                    self.maze.set(target, Cell::Snake(snake.id));
                    if let Some(vacated) = snake.advance(target, planned_move.direction, planned_move.grows)
                        && vacated != target
                        && self.maze.cell_at(vacated) == Cell::Snake(snake.id)
                    {
                        self.maze.set(vacated, Cell::Empty);
                    }
                    if planned_move.grows {
                        snake.feed(max_hunger);
                        events.push(TickEvent::Ate { snake: snake.id, at: target });
                    } else if snake.grow_hungrier() {
                        snake.kill(DeathReason::Starvation);
                        died.push(planned_move.index);
                    }
                }
                Err(reason) => {
                    snake.kill(reason);
                    died.push(planned_move.index);
                }
            }
        }

        for index in died {
            let snake = &self.competitors[index].snake;
            for position in &snake.body {
                if self.maze.cell_at(*position) == Cell::Snake(snake.id) {
                    self.maze.set(*position, Cell::Empty);
                }
            }
            if let Some(reason) = snake.death_reason {
                events.push(TickEvent::Died { snake: snake.id, reason });
            }
        }
    }

    fn replenish_food(&mut self, events: &mut Vec<TickEvent>) {
        let target = self.target_food();
        if let Err(shortage) = self.maze.reconcile_food(target, &mut self.rng) {
            events.push(TickEvent::FoodShortage {
                missing: shortage.requested - shortage.placed,
            });
        }
    }

    fn evaluate_status(&self) -> RunStatus {
        if self.settings.respawning {
            return RunStatus::Running;
        }
        let alive: Vec<SnakeId> = self.snakes().filter(|s| s.is_alive()).map(|s| s.id).collect();
        let finished = if self.initial_count <= 1 {
            alive.is_empty()
        } else {
            alive.len() <= 1
        };
        if finished {
            RunStatus::Finished { winner: alive.first().copied() }
        } else {
            RunStatus::Running
        }
    }

    fn capture(&self) -> Snapshot {
        Snapshot::capture(self.tick, &self.maze, self.snakes(), self.status)
    }

    /// A straight line of free cells, head first, for a new or respawning
    /// snake. Candidate heads follow the placement policy.
    fn find_spawn(&mut self) -> Option<Vec<Position>> {
        let length = self.settings.initial_snake_length;
        // Spawn lines never wrap around the edge.
        let bounds = Bounds::new(self.maze.bounds().width, self.maze.bounds().height, EdgeMode::Death);
        for head in self.maze.free_cells(&mut self.rng) {
            for facing in Direction::ALL {
                let mut body = vec![head];
                while body.len() < length {
                    let Some(next) = bounds.step(body[body.len() - 1], facing.opposite()) else {
                        break;
                    };
                    if !self.maze.is_free(next) {
                        break;
                    }
                    body.push(next);
                }
                if body.len() == length {
                    return Some(body);
                }
            }
        }
        None
    }

    fn check_start(&self, snake: &Snake, body: &[Position]) -> Result<(), EngineError> {
        let invalid = |reason: &str| {
            Err(EngineError::InvalidConfiguration(format!(
                "Start of snake {} ({}): {}",
                snake.id, snake.name, reason
            )))
        };
        if body.is_empty() {
            return invalid("empty body");
        }
        let bounds = self.maze.bounds();
        if body.iter().any(|p| !self.maze.is_in_bounds(*p) || !self.maze.is_free(*p)) {
            return invalid("cell outside the maze or already taken");
        }
        let unique: HashSet<&Position> = body.iter().collect();
        if unique.len() != body.len() {
            return invalid("body overlaps itself");
        }
        let adjacent = body
            .windows(2)
            .all(|pair| Direction::ALL.iter().any(|d| bounds.step(pair[0], *d) == Some(pair[1])));
        if !adjacent {
            return invalid("segments are not adjacent");
        }
        Ok(())
    }

    fn log_event(&self, event: &TickEvent) {
        let name = |id: &SnakeId| self.snake(*id).map(|s| s.name.as_str()).unwrap_or("?");
        match event {
            TickEvent::Ate { snake, at } => {
                log!("[tick {}] {} ({}) ate food at {}", self.tick, name(snake), snake, at)
            }
            TickEvent::Died { snake, reason } => {
                log!("[tick {}] {} ({}) {}", self.tick, name(snake), snake, reason.describe())
            }
            TickEvent::Respawned { snake, at } => {
                log!("[tick {}] {} ({}) respawned at {}", self.tick, name(snake), snake, at)
            }
            TickEvent::Removed { snake } => {
                log!("[tick {}] {} ({}) is out of the competition", self.tick, name(snake), snake)
            }
            TickEvent::Fallback { snake, error, direction } => {
                log!(
                    "[tick {}] {} ({}): {}, keeping {}",
                    self.tick,
                    name(snake),
                    snake,
                    error,
                    direction
                )
            }
            TickEvent::FoodShortage { missing } => {
                log!("[tick {}] Maze is full, {} pieces of food could not be placed", self.tick, missing)
            }
        }
    }
}

fn place(maze: &mut Maze, snake: &mut Snake, body: Vec<Position>, max_hunger: Option<u32>) {
    for position in &body {
        maze.set(*position, Cell::Snake(snake.id));
    }
    snake.spawn(body, max_hunger);
}
