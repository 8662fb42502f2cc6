use std::sync::Arc;

use snake_engine::snake::SnakeState;
use snake_engine::{RunStatus, Snapshot, log};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

pub fn render(snapshot: &Snapshot) -> String {
    let mut lines = vec![format!(
        "Tick {} | {} of {} alive | {} food",
        snapshot.tick,
        snapshot.alive_count(),
        snapshot.snakes.len(),
        snapshot.food.len()
    )];
    for (place, snake) in snapshot.standings().into_iter().enumerate() {
        let state = match snake.state {
            SnakeState::Alive => format!("alive, length {}", snake.body.len()),
            SnakeState::Dead => match snake.death_reason {
                Some(reason) => format!("dead, {}", reason.describe()),
                None => "dead".to_string(),
            },
            SnakeState::RespawnPending => "waiting to respawn".to_string(),
            SnakeState::Removed => "out".to_string(),
        };
        lines.push(format!(
            "{:>3}. {:<20} {:>4} score {:>5} deaths {:>3}  {}",
            place + 1,
            snake.name,
            snake.id,
            snake.score,
            snake.deaths,
            state
        ));
    }
    lines.join("\n")
}

pub fn render_result(snapshot: &Snapshot) -> String {
    match snapshot.status {
        RunStatus::Running => "Competition stopped while running".to_string(),
        RunStatus::Finished { winner: None } => "Competition finished without a survivor".to_string(),
        RunStatus::Finished { winner: Some(id) } => match snapshot.snake(id) {
            Some(snake) => format!("Competition won by {} {}", snake.name, id),
            None => format!("Competition won by {}", id),
        },
    }
}

/// Prints the standings every `every` ticks. Snapshots the printer misses while
/// it is busy are skipped; the tick loop never waits for it.
pub fn spawn(receiver: broadcast::Receiver<Arc<Snapshot>>, every: u64) -> JoinHandle<()> {
    let every = every.max(1);
    tokio::spawn(async move {
        let mut stream = BroadcastStream::new(receiver);
        while let Some(item) = stream.next().await {
            match item {
                Ok(snapshot) if snapshot.tick % every == 0 => println!("{}\n", render(&snapshot)),
                Ok(_) => {}
                Err(e) => log!("Scoreboard skipped snapshots: {}", e),
            }
        }
    })
}
