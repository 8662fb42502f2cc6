use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::controller::{Controller, ControllerView, DEFAULT_DIRECTION};
use crate::geometry::{Direction, Position};
use crate::session_rng::SessionRng;

/// Built-in controller kinds an agent descriptor can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Straight,
    RandomWalk,
    FoodSeeker,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Straight, Strategy::RandomWalk, Strategy::FoodSeeker];

    pub fn build(&self, seed: u64) -> Arc<dyn Controller> {
        match self {
            Strategy::Straight => Arc::new(Straight),
            Strategy::RandomWalk => Arc::new(RandomWalk::new(seed)),
            Strategy::FoodSeeker => Arc::new(FoodSeeker::new(seed)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Straight => "straight",
            Strategy::RandomWalk => "random_walk",
            Strategy::FoodSeeker => "food_seeker",
        }
    }
}

/// Never turns.
pub struct Straight;

impl Controller for Straight {
    fn decide(&self, view: &ControllerView) -> Result<Direction, String> {
        Ok(view.direction().unwrap_or(DEFAULT_DIRECTION))
    }
}

/// Picks uniformly among the directions that do not hit anything right now.
pub struct RandomWalk {
    rng: Mutex<SessionRng>,
}

impl RandomWalk {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SessionRng::new(seed)),
        }
    }
}

impl Controller for RandomWalk {
    fn decide(&self, view: &ControllerView) -> Result<Direction, String> {
        let safe = view.safe_directions();
        if safe.is_empty() {
            return Ok(view.direction().unwrap_or(DEFAULT_DIRECTION));
        }
        let mut rng = self.rng.lock().map_err(|_| "random source poisoned".to_string())?;
        Ok(safe[rng.random_range(0..safe.len())])
    }
}

/// Heads for the nearest food along safe cells, wandering randomly when there
/// is nothing to eat.
pub struct FoodSeeker {
    fallback: RandomWalk,
}

impl FoodSeeker {
    pub fn new(seed: u64) -> Self {
        Self {
            fallback: RandomWalk::new(seed),
        }
    }

    fn nearest_food(view: &ControllerView, from: Position) -> Option<Position> {
        let bounds = view.snapshot().bounds;
        view.snapshot()
            .food
            .iter()
            .min_by_key(|food| (bounds.distance(from, **food), **food))
            .copied()
    }
}

impl Controller for FoodSeeker {
    fn decide(&self, view: &ControllerView) -> Result<Direction, String> {
        let head = view.head().ok_or_else(|| "snake is not on the board".to_string())?;
        let Some(target) = Self::nearest_food(view, head) else {
            return self.fallback.decide(view);
        };

        let bounds = view.snapshot().bounds;
        let best = view
            .safe_directions()
            .into_iter()
            .filter_map(|direction| {
                let next = view.next_position(direction)?;
                Some((bounds.distance(next, target), direction))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, direction)| direction);

        match best {
            Some(direction) => Ok(direction),
            None => self.fallback.decide(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, EdgeMode};
    use crate::identifiers::SnakeId;
    use crate::maze::{Cell, Maze};
    use crate::settings::PlacementPolicy;
    use crate::snake::Snake;
    use crate::snapshot::{RunStatus, Snapshot};

    fn view(body: Vec<Position>, food: &[Position], walls: &[Position]) -> ControllerView {
        let mut maze = Maze::empty(Bounds::new(7, 7, EdgeMode::Death), PlacementPolicy::Scan);
        let mut snake = Snake::new(SnakeId::new(1), "bot".to_string());
        for p in &body {
            maze.set(*p, Cell::Snake(snake.id));
        }
        for f in food {
            maze.set(*f, Cell::Food);
        }
        for w in walls {
            maze.set(*w, Cell::Wall);
        }
        snake.spawn(body, None);
        ControllerView::new(Arc::new(Snapshot::capture(0, &maze, [&snake], RunStatus::Running)), snake.id)
    }

    #[test]
    fn test_straight_keeps_direction() {
        let v = view(vec![Position::new(3, 3), Position::new(2, 3)], &[], &[]);
        assert_eq!(Straight.decide(&v), Ok(Direction::Right));
    }

    #[test]
    fn test_straight_defaults_without_direction() {
        let v = view(vec![Position::new(3, 3)], &[], &[]);
        assert_eq!(Straight.decide(&v), Ok(DEFAULT_DIRECTION));
    }

    #[test]
    fn test_food_seeker_moves_toward_food() {
        let v = view(vec![Position::new(3, 3), Position::new(3, 2)], &[Position::new(6, 3)], &[]);
        let seeker = FoodSeeker::new(1);
        assert_eq!(seeker.decide(&v), Ok(Direction::Right));
    }

    #[test]
    fn test_food_seeker_avoids_wall_on_shortest_path() {
        let v = view(
            vec![Position::new(3, 3), Position::new(3, 2)],
            &[Position::new(5, 3)],
            &[Position::new(4, 3)],
        );
        let seeker = FoodSeeker::new(1);
        let decision = seeker.decide(&v).unwrap();
        assert_ne!(decision, Direction::Right);
        assert_ne!(decision, Direction::Down);
    }

    #[test]
    fn test_random_walk_only_picks_safe_directions() {
        let v = view(
            vec![Position::new(0, 1), Position::new(0, 0)],
            &[],
            &[Position::new(1, 1)],
        );
        let walker = RandomWalk::new(3);
        for _ in 0..20 {
            assert_eq!(walker.decide(&v), Ok(Direction::Up));
        }
    }

    #[test]
    fn test_strategy_names_parse() {
        let parsed: Strategy = serde_yaml_ng::from_str("food_seeker").unwrap();
        assert_eq!(parsed, Strategy::FoodSeeker);
        for strategy in Strategy::ALL {
            let parsed: Strategy = serde_yaml_ng::from_str(strategy.name()).unwrap();
            assert_eq!(parsed, strategy);
        }
    }
}
