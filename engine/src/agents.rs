use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bots::Strategy;
use crate::controller::{AgentLoad, ControllerSource, Entrant};
use crate::error::{AgentLoadFailure, LoadError};
use crate::log;

/// Contents of one agent file in the agent directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Display name; the file stem when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub strategy: Strategy,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Loads every `*.yaml` / `*.yml` file of a directory as an agent, in file
/// name order.
pub struct DirectorySource {
    base_seed: u64,
}

impl DirectorySource {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    fn is_agent_file(path: &Path) -> bool {
        path.is_file()
            && matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
    }

    fn load_one(&self, path: &Path, index: usize) -> AgentLoad {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let failure = |reason: String| AgentLoadFailure {
            agent: stem.clone(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
        let descriptor: AgentDescriptor =
            serde_yaml_ng::from_str(&content).map_err(|e| failure(e.to_string()))?;

        let name = match descriptor.name {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => return Err(failure("name must not be blank".to_string())),
            None => stem.clone(),
        };
        let seed = descriptor.seed.unwrap_or(self.base_seed ^ index as u64);
        Ok(Entrant::new(name, descriptor.strategy.build(seed)))
    }
}

impl ControllerSource for DirectorySource {
    fn load(&self, directory: &Path) -> Result<Vec<AgentLoad>, LoadError> {
        if !directory.is_dir() {
            return Err(LoadError::NotADirectory(directory.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| Self::is_agent_file(path))
            .collect();
        paths.sort();

        log!("Found {} agent files in {}", paths.len(), directory.display());
        Ok(paths
            .iter()
            .enumerate()
            .map(|(index, path)| self.load_one(path, index))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_agent_dir() -> PathBuf {
        let mut path = env::temp_dir();
        let random_number: u32 = rand::random();
        path.push(format!("temp_snake_arena_agents_{}", random_number));
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_loads_agents_in_name_order() {
        let dir = temp_agent_dir();
        fs::write(dir.join("b_seeker.yaml"), "strategy: food_seeker\n").unwrap();
        fs::write(dir.join("a_straight.yml"), "name: Arrow\nstrategy: straight\n").unwrap();
        fs::write(dir.join("notes.txt"), "not an agent").unwrap();

        let loaded = DirectorySource::new(7).load(&dir).unwrap();
        let names: Vec<String> = loaded.iter().map(|l| l.as_ref().unwrap().name.clone()).collect();
        assert_eq!(names, vec!["Arrow".to_string(), "b_seeker".to_string()]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_broken_agent_is_reported_alone() {
        let dir = temp_agent_dir();
        fs::write(dir.join("good.yaml"), "strategy: random_walk\nseed: 3\n").unwrap();
        fs::write(dir.join("bad.yaml"), "strategy: teleport\n").unwrap();
        fs::write(dir.join("blank.yaml"), "name: \"  \"\nstrategy: straight\n").unwrap();

        let loaded = DirectorySource::new(0).load(&dir).unwrap();
        assert_eq!(loaded.len(), 3);
        let failures: Vec<&AgentLoadFailure> = loaded.iter().filter_map(|l| l.as_ref().err()).collect();
        let agents: Vec<&str> = failures.iter().map(|f| f.agent.as_str()).collect();
        assert_eq!(agents, vec!["bad", "blank"]);
        assert!(loaded.iter().any(|l| matches!(l, Ok(entrant) if entrant.name == "good")));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let mut path = env::temp_dir();
        path.push("temp_snake_arena_agents_does_not_exist");
        let result = DirectorySource::new(0).load(&path);
        assert!(matches!(result, Err(LoadError::NotADirectory(_))));
    }
}
