use std::path::Path;

use snake_engine::agents::DirectorySource;
use snake_engine::bots::Strategy;
use snake_engine::{ControllerSource, Entrant, LoadError, log};

/// Entrants discovered in `directory`. Agents that fail to load are logged
/// and left out.
pub fn from_directory(directory: &Path, base_seed: u64) -> Result<Vec<Entrant>, LoadError> {
    let loaded = DirectorySource::new(base_seed).load(directory)?;
    let mut entrants = Vec::with_capacity(loaded.len());
    for load in loaded {
        match load {
            Ok(entrant) => {
                log!("Loaded agent {}", entrant.name);
                entrants.push(entrant);
            }
            Err(failure) => log!("{}", failure),
        }
    }
    Ok(entrants)
}

/// `count` built-in bots, cycling through every strategy.
pub fn built_in(count: usize, base_seed: u64) -> Vec<Entrant> {
    (0..count)
        .map(|index| {
            let strategy = Strategy::ALL[index % Strategy::ALL.len()];
            let seed = base_seed ^ index as u64;
            Entrant::new(format!("{}_{}", strategy.name(), index + 1), strategy.build(seed))
        })
        .collect()
}
