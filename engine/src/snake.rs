use std::collections::VecDeque;

use crate::geometry::{Direction, Position};
use crate::identifiers::SnakeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnakeState {
    Alive,
    /// Died during the last tick; its cells are already free.
    Dead,
    /// Waiting for a free spot to re-enter the maze.
    RespawnPending,
    /// Out of the competition for good.
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    OutOfBounds,
    SelfCollision,
    SnakeCollision,
    Starvation,
}

impl DeathReason {
    pub fn describe(&self) -> &'static str {
        match self {
            DeathReason::WallCollision => "hit a wall",
            DeathReason::OutOfBounds => "left the maze",
            DeathReason::SelfCollision => "bit itself",
            DeathReason::SnakeCollision => "hit another snake",
            DeathReason::Starvation => "starved",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    pub id: SnakeId,
    pub name: String,
    pub body: VecDeque<Position>,
    pub direction: Option<Direction>,
    /// Ticks left before starving; `None` when no hunger cap is configured.
    pub hunger: Option<u32>,
    pub state: SnakeState,
    pub death_reason: Option<DeathReason>,
    pub score: u32,
    pub deaths: u32,
}

impl Snake {
    pub fn new(id: SnakeId, name: String) -> Self {
        Self {
            id,
            name,
            body: VecDeque::new(),
            direction: None,
            hunger: None,
            state: SnakeState::RespawnPending,
            death_reason: None,
            score: 0,
            deaths: 0,
        }
    }

    /// Brings the snake (back) to life on `body`, head first. A body of two or
    /// more segments faces away from its neck; a single segment has no
    /// direction yet.
    pub fn spawn(&mut self, body: Vec<Position>, max_hunger: Option<u32>) {
        self.direction = match body.as_slice() {
            [head, neck, ..] => Some(neck.compute_direction(*head)),
            _ => None,
        };
        self.body = body.into();
        self.hunger = max_hunger;
        self.state = SnakeState::Alive;
        self.death_reason = None;
    }

    pub fn is_alive(&self) -> bool {
        self.state == SnakeState::Alive
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }

    pub fn tail(&self) -> Option<Position> {
        self.body.back().copied()
    }

    /// Pushes a new head. Without growth the tail segment is dropped and
    /// returned so the caller can free its cell.
    pub fn advance(&mut self, next_head: Position, direction: Direction, grows: bool) -> Option<Position> {
        self.direction = Some(direction);
        self.body.push_front(next_head);
        if grows {
            return None;
        }
        self.body.pop_back()
    }

    /// Fed snakes are back at full hunger.
    pub fn feed(&mut self, max_hunger: Option<u32>) {
        self.score += 1;
        self.hunger = max_hunger;
    }

    /// One tick without food. Returns `true` when the snake has starved.
    pub fn grow_hungrier(&mut self) -> bool {
        match self.hunger.as_mut() {
            Some(hunger) => {
                *hunger = hunger.saturating_sub(1);
                *hunger == 0
            }
            None => false,
        }
    }

    pub fn kill(&mut self, reason: DeathReason) {
        if self.is_alive() {
            self.state = SnakeState::Dead;
            self.death_reason = Some(reason);
            self.deaths += 1;
        }
    }

    /// Moves a dead snake on to its next lifecycle state and clears its body.
    pub fn retire(&mut self, respawning: bool) {
        if self.state != SnakeState::Dead {
            return;
        }
        self.body.clear();
        self.state = if respawning {
            SnakeState::RespawnPending
        } else {
            SnakeState::Removed
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(body: Vec<Position>, max_hunger: Option<u32>) -> Snake {
        let mut snake = Snake::new(SnakeId::new(1), "test".to_string());
        snake.spawn(body, max_hunger);
        snake
    }

    #[test]
    fn test_spawn_faces_away_from_neck() {
        let snake = spawned(vec![Position::new(3, 5), Position::new(3, 4), Position::new(3, 3)], Some(10));
        assert_eq!(snake.direction, Some(Direction::Up));
        assert_eq!(snake.head(), Some(Position::new(3, 5)));
        assert_eq!(snake.tail(), Some(Position::new(3, 3)));
        assert!(snake.is_alive());
        assert_eq!(snake.hunger, Some(10));
    }

    #[test]
    fn test_single_segment_has_no_direction() {
        let snake = spawned(vec![Position::new(1, 1)], None);
        assert_eq!(snake.direction, None);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_advance_without_growth_shifts_body() {
        let mut snake = spawned(vec![Position::new(2, 2), Position::new(1, 2), Position::new(0, 2)], None);
        let vacated = snake.advance(Position::new(3, 2), Direction::Right, false);
        assert_eq!(vacated, Some(Position::new(0, 2)));
        assert_eq!(snake.len(), 3);
        assert!(!snake.body.contains(&Position::new(0, 2)));
        assert_eq!(snake.head(), Some(Position::new(3, 2)));
    }

    #[test]
    fn test_advance_with_growth_keeps_tail() {
        let mut snake = spawned(vec![Position::new(2, 2), Position::new(1, 2)], None);
        let vacated = snake.advance(Position::new(2, 3), Direction::Up, true);
        assert_eq!(vacated, None);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.direction, Some(Direction::Up));
    }

    #[test]
    fn test_moving_into_own_tail_keeps_cell() {
        let mut snake = spawned(
            vec![Position::new(1, 1), Position::new(1, 2), Position::new(2, 2), Position::new(2, 1)],
            None,
        );
        let vacated = snake.advance(Position::new(2, 1), Direction::Right, false);
        assert_eq!(vacated, Some(Position::new(2, 1)));
        assert_eq!(snake.head(), Some(Position::new(2, 1)));
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn test_hunger_counts_down_to_starvation() {
        let mut snake = spawned(vec![Position::new(1, 1)], Some(2));
        assert!(!snake.grow_hungrier());
        assert!(snake.grow_hungrier());
        assert_eq!(snake.hunger, Some(0));
    }

    #[test]
    fn test_no_cap_never_starves() {
        let mut snake = spawned(vec![Position::new(1, 1)], None);
        for _ in 0..1000 {
            assert!(!snake.grow_hungrier());
        }
    }

    #[test]
    fn test_feed_resets_hunger_and_scores() {
        let mut snake = spawned(vec![Position::new(1, 1)], Some(5));
        snake.grow_hungrier();
        snake.grow_hungrier();
        snake.feed(Some(5));
        assert_eq!(snake.hunger, Some(5));
        assert_eq!(snake.score, 1);
    }

    #[test]
    fn test_death_lifecycle() {
        let mut snake = spawned(vec![Position::new(1, 1)], None);
        snake.kill(DeathReason::Starvation);
        assert_eq!(snake.state, SnakeState::Dead);
        assert_eq!(snake.deaths, 1);
        snake.kill(DeathReason::WallCollision);
        assert_eq!(snake.death_reason, Some(DeathReason::Starvation));
        assert_eq!(snake.deaths, 1);

        snake.retire(false);
        assert_eq!(snake.state, SnakeState::Removed);
        assert!(snake.is_empty());
    }

    #[test]
    fn test_retire_with_respawning() {
        let mut snake = spawned(vec![Position::new(1, 1)], None);
        snake.kill(DeathReason::SnakeCollision);
        snake.retire(true);
        assert_eq!(snake.state, SnakeState::RespawnPending);
        snake.spawn(vec![Position::new(3, 3)], Some(4));
        assert!(snake.is_alive());
        assert_eq!(snake.death_reason, None);
        assert_eq!(snake.deaths, 1);
    }
}
