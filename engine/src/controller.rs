use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{AgentLoadFailure, ControllerError, LoadError};
use crate::geometry::{Direction, Position};
use crate::identifiers::SnakeId;
use crate::snapshot::{Snapshot, SnakeView};

/// Direction used when a snake has never moved and its controller gave no
/// answer.
pub const DEFAULT_DIRECTION: Direction = Direction::Up;

/// Decision logic for one snake.
///
/// `decide` runs on a blocking worker thread with a time budget. Returning an
/// error, panicking or overrunning the budget all count as "no decision" and
/// the engine keeps the snake going in its last direction. A decision that
/// kills the snake, like reversing into its own neck, is honoured.
pub trait Controller: Send + Sync {
    fn decide(&self, view: &ControllerView) -> Result<Direction, String>;
}

impl<F> Controller for F
where
    F: Fn(&ControllerView) -> Result<Direction, String> + Send + Sync,
{
    fn decide(&self, view: &ControllerView) -> Result<Direction, String> {
        self(view)
    }
}

/// What a controller gets to see: the shared snapshot and which snake it is
/// steering.
#[derive(Clone)]
pub struct ControllerView {
    snapshot: Arc<Snapshot>,
    me: SnakeId,
}

impl ControllerView {
    pub fn new(snapshot: Arc<Snapshot>, me: SnakeId) -> Self {
        Self { snapshot, me }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn me(&self) -> SnakeId {
        self.me
    }

    pub fn snake(&self) -> Option<&SnakeView> {
        self.snapshot.snake(self.me)
    }

    pub fn head(&self) -> Option<Position> {
        self.snake().and_then(|s| s.head())
    }

    pub fn direction(&self) -> Option<Direction> {
        self.snake().and_then(|s| s.direction)
    }

    /// Where `direction` would take the head, `None` off a deadly edge.
    pub fn next_position(&self, direction: Direction) -> Option<Position> {
        let head = self.head()?;
        self.snapshot.bounds.step(head, direction)
    }

    /// Directions whose target cell is free right now. The own tail counts as
    /// free since it moves away this tick.
    pub fn safe_directions(&self) -> Vec<Direction> {
        let tail = self.snake().and_then(|s| s.body.last().copied());
        let neck = self.snake().and_then(|s| s.body.get(1).copied());
        Direction::ALL
            .into_iter()
            .filter(|direction| {
                let Some(next) = self.next_position(*direction) else {
                    return false;
                };
                if Some(next) == neck {
                    return false;
                }
                self.snapshot.is_passable(next) || (Some(next) == tail && neck.is_some())
            })
            .collect()
    }
}

/// A controller plus a marker for a decision call that has not returned yet.
/// A call abandoned after its budget keeps its blocking thread until the
/// controller returns; while it is still running no new call is started, so a
/// stuck controller holds at most one thread of the blocking pool.
#[derive(Clone)]
pub struct ControllerHandle {
    controller: Arc<dyn Controller>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight marker when the blocking call ends, panics included.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ControllerHandle {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self {
            controller,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while an earlier call is still running on the blocking pool.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Asks the controller for a decision without letting it hold up the
    /// tick. The call is abandoned after `budget`; a panic inside it is
    /// caught. A controller still busy with an earlier call times out at once.
    pub async fn request_decision(&self, view: ControllerView, budget: Duration) -> Result<Direction, ControllerError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControllerError::Timeout(budget));
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let controller = Arc::clone(&self.controller);
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            controller.decide(&view)
        });
        match tokio::time::timeout(budget, handle).await {
            Err(_) => Err(ControllerError::Timeout(budget)),
            Ok(Err(join_error)) if join_error.is_panic() => Err(ControllerError::Failure("panicked".to_string())),
            Ok(Err(join_error)) => Err(ControllerError::Failure(join_error.to_string())),
            Ok(Ok(Err(reason))) => Err(ControllerError::Failure(reason)),
            Ok(Ok(Ok(direction))) => Ok(direction),
        }
    }
}

/// A named controller ready to enter the competition.
#[derive(Clone)]
pub struct Entrant {
    pub name: String,
    pub controller: Arc<dyn Controller>,
    /// Fixed starting body, head first. `None` lets the engine pick a spot.
    pub start: Option<Vec<Position>>,
}

impl Entrant {
    pub fn new(name: impl Into<String>, controller: Arc<dyn Controller>) -> Self {
        Self {
            name: name.into(),
            controller,
            start: None,
        }
    }

    pub fn starting_at(mut self, body: Vec<Position>) -> Self {
        self.start = Some(body);
        self
    }
}

impl std::fmt::Debug for Entrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entrant")
            .field("name", &self.name)
            .field("start", &self.start)
            .finish()
    }
}

pub type AgentLoad = Result<Entrant, AgentLoadFailure>;

/// Discovers agent programs in a directory. One result per discovered agent:
/// a broken agent is reported on its own and the others still compete.
pub trait ControllerSource {
    fn load(&self, directory: &Path) -> Result<Vec<AgentLoad>, LoadError>;
}
