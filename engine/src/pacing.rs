use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::log;
use crate::scheduler::Simulation;
use crate::snapshot::RunStatus;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Speed {
    Slowest,
    Slow,
    #[default]
    Normal,
    Fast,
    Fastest,
    /// No pause between ticks at all.
    Unlimited,
}

impl Speed {
    pub const ALL: [Speed; 6] = [
        Speed::Slowest,
        Speed::Slow,
        Speed::Normal,
        Speed::Fast,
        Speed::Fastest,
        Speed::Unlimited,
    ];

    pub fn delay(&self) -> Duration {
        let millis = match self {
            Speed::Slowest => 1000,
            Speed::Slow => 500,
            Speed::Normal => 200,
            Speed::Fast => 100,
            Speed::Fastest => 25,
            Speed::Unlimited => 0,
        };
        Duration::from_millis(millis)
    }

    pub fn faster(&self) -> Speed {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + 1).min(Self::ALL.len() - 1)]
    }

    pub fn slower(&self) -> Speed {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[index.saturating_sub(1)]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Speed::Slowest => "slowest",
            Speed::Slow => "slow",
            Speed::Normal => "normal",
            Speed::Fast => "fast",
            Speed::Fastest => "fastest",
            Speed::Unlimited => "unlimited",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|speed| speed.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("Unknown speed '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// The live-adjustable part of the settings. Only the pacer listens to it.
pub struct SpeedControl {
    sender: watch::Sender<Speed>,
}

impl SpeedControl {
    pub fn new(initial: Speed) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn current(&self) -> Speed {
        *self.sender.borrow()
    }

    pub fn set(&self, speed: Speed) {
        self.sender.send_if_modified(|current| {
            if *current == speed {
                return false;
            }
            *current = speed;
            true
        });
    }

    pub fn faster(&self) -> Speed {
        let speed = self.current().faster();
        self.set(speed);
        speed
    }

    pub fn slower(&self) -> Speed {
        let speed = self.current().slower();
        self.set(speed);
        speed
    }

    pub fn subscribe(&self) -> watch::Receiver<Speed> {
        self.sender.subscribe()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Finished,
    Stopped,
    TickLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub status: RunStatus,
    pub reason: StopReason,
}

/// Drives `simulation` tick after tick, pausing according to the current
/// speed. Returns when the run finishes, `stop` turns true or `max_ticks`
/// ticks have been played. A speed change takes effect during the pause it
/// arrives in.
pub async fn run_paced(
    simulation: &mut Simulation,
    mut speed: watch::Receiver<Speed>,
    mut stop: watch::Receiver<bool>,
    max_ticks: Option<u64>,
) -> RunSummary {
    let mut ticks = 0u64;
    let reason = loop {
        if *stop.borrow_and_update() {
            break StopReason::Stopped;
        }
        if let RunStatus::Finished { .. } = simulation.status() {
            break StopReason::Finished;
        }
        if let Some(limit) = max_ticks
            && ticks >= limit
        {
            break StopReason::TickLimit;
        }

        let started = Instant::now();
        simulation.step().await;
        ticks += 1;

        pause(started, &mut speed, &mut stop).await;
    };

    log!(
        "Run ended after {} ticks ({:?}) at tick {}",
        ticks,
        reason,
        simulation.tick()
    );
    RunSummary {
        ticks,
        status: simulation.status(),
        reason,
    }
}

/// Sleeps until `started + delay`, re-reading the delay whenever the speed
/// changes and waking early on a stop request.
async fn pause(started: Instant, speed: &mut watch::Receiver<Speed>, stop: &mut watch::Receiver<bool>) {
    loop {
        let delay = speed.borrow_and_update().delay();
        if delay.is_zero() {
            tokio::task::yield_now().await;
            return;
        }
        let deadline = started + delay;
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return,
            changed = speed.changed() => {
                if changed.is_err() {
                    tokio::time::sleep_until(deadline).await;
                    return;
                }
            }
            changed = stop.changed() => {
                if changed.is_err() {
                    tokio::time::sleep_until(deadline).await;
                }
                return;
            }
        }
    }
}
