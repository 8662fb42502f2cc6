use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate. The y axis grows upward, so `Up` is `y + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Direction in which `target` lies as seen from `self`.
    ///
    /// The x axis is checked first. A distance of exactly one, or any distance
    /// below minus one, counts as the positive direction; the latter covers a
    /// neighbour reached by wrapping around the board. Every other distance,
    /// including zero on both axes, falls through to `Down` or `Left`.
    pub fn compute_direction(&self, target: Position) -> Direction {
        let x_dist = target.x as i64 - self.x as i64;
        let y_dist = target.y as i64 - self.y as i64;
        if x_dist == 0 {
            if y_dist == 1 || y_dist < -1 {
                return Direction::Up;
            }
            return Direction::Down;
        } else if x_dist == 1 || x_dist < -1 {
            return Direction::Right;
        }
        Direction::Left
    }

    pub fn manhattan_distance(&self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// What happens when a head is moved past the board edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeMode {
    #[default]
    Death,
    WrapAround,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: usize,
    pub height: usize,
    pub edge_mode: EdgeMode,
}

impl Bounds {
    pub fn new(width: usize, height: usize, edge_mode: EdgeMode) -> Self {
        Self { width, height, edge_mode }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn index_of(&self, position: Position) -> usize {
        position.y * self.width + position.x
    }

    pub fn position_of(&self, index: usize) -> Position {
        Position::new(index % self.width, index / self.width)
    }

    /// The neighbour of `from` in `direction`, or `None` when the move leaves
    /// the board and the edge is deadly.
    pub fn step(&self, from: Position, direction: Direction) -> Option<Position> {
        match self.edge_mode {
            EdgeMode::Death => match direction {
                Direction::Up if from.y + 1 < self.height => Some(Position::new(from.x, from.y + 1)),
                Direction::Down if from.y > 0 => Some(Position::new(from.x, from.y - 1)),
                Direction::Left if from.x > 0 => Some(Position::new(from.x - 1, from.y)),
                Direction::Right if from.x + 1 < self.width => Some(Position::new(from.x + 1, from.y)),
                _ => None,
            },
            EdgeMode::WrapAround => Some(match direction {
                Direction::Up => Position::new(from.x, wrapping_inc(from.y, self.height)),
                Direction::Down => Position::new(from.x, wrapping_dec(from.y, self.height)),
                Direction::Left => Position::new(wrapping_dec(from.x, self.width), from.y),
                Direction::Right => Position::new(wrapping_inc(from.x, self.width), from.y),
            }),
        }
    }

    /// Shortest step count between two cells, honouring wraparound.
    pub fn distance(&self, a: Position, b: Position) -> usize {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        match self.edge_mode {
            EdgeMode::Death => dx + dy,
            EdgeMode::WrapAround => dx.min(self.width - dx) + dy.min(self.height - dy),
        }
    }
}

fn wrapping_inc(value: usize, max: usize) -> usize {
    if value + 1 >= max { 0 } else { value + 1 }
}

fn wrapping_dec(value: usize, max: usize) -> usize {
    if value == 0 { max - 1 } else { value - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_directions() {
        let p = Position::new(4, 4);
        assert_eq!(p.compute_direction(Position::new(4, 5)), Direction::Up);
        assert_eq!(p.compute_direction(Position::new(4, 3)), Direction::Down);
        assert_eq!(p.compute_direction(Position::new(5, 4)), Direction::Right);
        assert_eq!(p.compute_direction(Position::new(3, 4)), Direction::Left);
    }

    #[test]
    fn test_large_positive_distance_is_not_wraparound() {
        // yDist = 9 is neither 1 nor below -1
        let direction = Position::new(0, 0).compute_direction(Position::new(0, 9));
        assert_eq!(direction, Direction::Down);
    }

    #[test]
    fn test_wraparound_neighbours() {
        assert_eq!(Position::new(0, 9).compute_direction(Position::new(0, 0)), Direction::Up);
        assert_eq!(Position::new(9, 0).compute_direction(Position::new(0, 0)), Direction::Right);
        assert_eq!(Position::new(0, 0).compute_direction(Position::new(9, 0)), Direction::Left);
    }

    #[test]
    fn test_x_axis_checked_first() {
        let p = Position::new(2, 2);
        assert_eq!(p.compute_direction(Position::new(3, 7)), Direction::Right);
        assert_eq!(p.compute_direction(Position::new(0, 3)), Direction::Right);
        assert_eq!(p.compute_direction(Position::new(4, 3)), Direction::Left);
        assert_eq!(p.compute_direction(p), Direction::Down);
    }

    #[test]
    fn test_step_death_mode_stops_at_edges() {
        let bounds = Bounds::new(5, 5, EdgeMode::Death);
        assert_eq!(bounds.step(Position::new(0, 0), Direction::Down), None);
        assert_eq!(bounds.step(Position::new(0, 0), Direction::Left), None);
        assert_eq!(bounds.step(Position::new(4, 4), Direction::Up), None);
        assert_eq!(bounds.step(Position::new(4, 4), Direction::Right), None);
        assert_eq!(bounds.step(Position::new(2, 2), Direction::Up), Some(Position::new(2, 3)));
    }

    #[test]
    fn test_step_wraparound() {
        let bounds = Bounds::new(5, 6, EdgeMode::WrapAround);
        assert_eq!(bounds.step(Position::new(0, 0), Direction::Down), Some(Position::new(0, 5)));
        assert_eq!(bounds.step(Position::new(4, 0), Direction::Right), Some(Position::new(0, 0)));
        let from = Position::new(0, 5);
        let to = bounds.step(from, Direction::Up).unwrap();
        assert_eq!(from.compute_direction(to), Direction::Up);
    }

    #[test]
    fn test_step_agrees_with_compute_direction() {
        let bounds = Bounds::new(10, 10, EdgeMode::Death);
        let from = Position::new(5, 5);
        for direction in Direction::ALL {
            let to = bounds.step(from, direction).unwrap();
            assert_eq!(from.compute_direction(to), direction);
        }
    }

    #[test]
    fn test_wrapped_distance() {
        let bounds = Bounds::new(10, 10, EdgeMode::WrapAround);
        assert_eq!(bounds.distance(Position::new(0, 0), Position::new(9, 9)), 2);
        let bounded = Bounds::new(10, 10, EdgeMode::Death);
        assert_eq!(bounded.distance(Position::new(0, 0), Position::new(9, 9)), 18);
    }
}
