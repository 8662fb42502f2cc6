pub mod logger;
pub mod config;
pub mod error;
pub mod geometry;
pub mod identifiers;
pub mod session_rng;
pub mod settings;
pub mod maze;
pub mod snake;
pub mod snapshot;
pub mod controller;
pub mod bots;
pub mod agents;
pub mod scheduler;
pub mod pacing;

pub use controller::{Controller, ControllerSource, ControllerView, Entrant};
pub use error::*;
pub use geometry::{Bounds, Direction, EdgeMode, Position};
pub use identifiers::*;
pub use pacing::{RunSummary, Speed, SpeedControl, StopReason, run_paced};
pub use scheduler::{Simulation, TickEvent, TickReport};
pub use settings::Settings;
pub use snapshot::{CellView, RunStatus, Snapshot, SnakeView};
