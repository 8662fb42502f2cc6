use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that prevent a simulation from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    InvalidConfiguration(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfiguration(reason) => write!(f, "Invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}

/// Why a controller produced no usable decision this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    Timeout(Duration),
    Failure(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Timeout(budget) => write!(f, "no decision within {} ms", budget.as_millis()),
            ControllerError::Failure(reason) => write!(f, "controller failed: {}", reason),
        }
    }
}

impl std::error::Error for ControllerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodPlacementExhausted {
    pub requested: usize,
    pub placed: usize,
}

impl fmt::Display for FoodPlacementExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No free cell left for food: placed {} of {}",
            self.placed, self.requested
        )
    }
}

impl std::error::Error for FoodPlacementExhausted {}

/// Failure to enumerate an agent directory at all.
#[derive(Debug)]
pub enum LoadError {
    NotADirectory(PathBuf),
    Io(std::io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            LoadError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

/// One agent that could not be loaded; the rest of the roster still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLoadFailure {
    pub agent: String,
    pub reason: String,
}

impl fmt::Display for AgentLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent {} not loaded: {}", self.agent, self.reason)
    }
}

impl std::error::Error for AgentLoadFailure {}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Write(std::io::Error),
    Parse(serde_yaml_ng::Error),
    Serialize(serde_yaml_ng::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Write(e) => write!(f, "Failed to write config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to deserialize config: {}", e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "Config validation error: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}
