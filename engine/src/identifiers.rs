use std::fmt;

/// Stable identity of one competitor. Resolution order within a tick is
/// ascending id, so the id doubles as the tie-breaker for contested cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnakeId(u32);

impl SnakeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for SnakeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SnakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
