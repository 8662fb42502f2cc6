use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub trait ConfigContentProvider {
    /// `Ok(None)` means there is no stored configuration yet.
    fn get_config_content(&self) -> Result<Option<String>, ConfigError>;
    fn set_config_content(&self, content: &str) -> Result<(), ConfigError>;
}

pub trait ConfigSerializer<TConfig> {
    fn serialize(&self, config: &TConfig) -> Result<String, ConfigError>;
    fn deserialize(&self, content: &str) -> Result<TConfig, ConfigError>;
}

#[derive(Default)]
pub struct YamlConfigSerializer;

impl<TConfig> ConfigSerializer<TConfig> for YamlConfigSerializer
where
    TConfig: for<'de> Deserialize<'de> + Serialize,
{
    fn serialize(&self, config: &TConfig) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(config).map_err(ConfigError::Serialize)
    }

    fn deserialize(&self, content: &str) -> Result<TConfig, ConfigError> {
        serde_yaml_ng::from_str(content).map_err(ConfigError::Parse)
    }
}

pub struct FileContentConfigProvider {
    file_path: PathBuf,
}

impl FileContentConfigProvider {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self { file_path: file_path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl ConfigContentProvider for FileContentConfigProvider {
    fn get_config_content(&self) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ConfigError::Read(err)),
        }
    }

    fn set_config_content(&self, content: &str) -> Result<(), ConfigError> {
        std::fs::write(&self.file_path, content).map_err(ConfigError::Write)
    }
}

/// Loads, validates, caches and saves one configuration value.
pub struct ConfigStore<TProvider, TConfig, TSerializer = YamlConfigSerializer>
where
    TProvider: ConfigContentProvider,
    TConfig: Clone + Validate + Default,
    TSerializer: ConfigSerializer<TConfig>,
{
    serializer: TSerializer,
    provider: TProvider,
    cached: Mutex<Option<TConfig>>,
}

impl<TConfig> ConfigStore<FileContentConfigProvider, TConfig, YamlConfigSerializer>
where
    TConfig: Clone + Validate + Default + for<'de> Deserialize<'de> + Serialize,
{
    pub fn from_yaml_file(file_path: impl Into<PathBuf>) -> Self {
        Self::new(FileContentConfigProvider::new(file_path), YamlConfigSerializer)
    }
}

impl<TProvider, TConfig, TSerializer> ConfigStore<TProvider, TConfig, TSerializer>
where
    TProvider: ConfigContentProvider,
    TConfig: Clone + Validate + Default,
    TSerializer: ConfigSerializer<TConfig>,
{
    pub fn new(provider: TProvider, serializer: TSerializer) -> Self {
        Self {
            serializer,
            provider,
            cached: Mutex::new(None),
        }
    }

    /// The stored configuration, or the defaults when nothing is stored.
    pub fn get_config(&self) -> Result<TConfig, ConfigError> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(config) = cached.as_ref() {
            return Ok(config.clone());
        }

        let Some(content) = self.provider.get_config_content()? else {
            return Ok(TConfig::default());
        };
        let config = self.serializer.deserialize(&content)?;
        config.validate().map_err(ConfigError::Invalid)?;

        *cached = Some(config.clone());
        Ok(config)
    }

    pub fn set_config(&self, config: &TConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        let content = self.serializer.serialize(config)?;
        self.provider.set_config_content(&content)?;

        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::geometry::EdgeMode;
    use crate::pacing::Speed;
    use crate::settings::Settings;

    #[derive(Default)]
    struct MemoryProvider {
        content: RefCell<Option<String>>,
    }

    impl ConfigContentProvider for MemoryProvider {
        fn get_config_content(&self) -> Result<Option<String>, ConfigError> {
            Ok(self.content.borrow().clone())
        }

        fn set_config_content(&self, content: &str) -> Result<(), ConfigError> {
            *self.content.borrow_mut() = Some(content.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_missing_content_yields_defaults() {
        let store: ConfigStore<_, Settings> = ConfigStore::new(MemoryProvider::default(), YamlConfigSerializer);
        assert_eq!(store.get_config().unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let provider = MemoryProvider::default();
        provider
            .set_config_content("width: 30\narena: true\nmax_hunger: null\nspeed: Fast\nedge_mode: WrapAround\n")
            .unwrap();
        let store: ConfigStore<_, Settings> = ConfigStore::new(provider, YamlConfigSerializer);
        let settings = store.get_config().unwrap();
        assert_eq!(settings.width, 30);
        assert_eq!(settings.height, 20);
        assert!(settings.arena);
        assert_eq!(settings.max_hunger, None);
        assert_eq!(settings.speed, Speed::Fast);
        assert_eq!(settings.edge_mode, EdgeMode::WrapAround);
    }

    #[test]
    fn test_invalid_content_rejected() {
        let provider = MemoryProvider::default();
        provider.set_config_content("width: 3\n").unwrap();
        let store: ConfigStore<_, Settings> = ConfigStore::new(provider, YamlConfigSerializer);
        assert!(matches!(store.get_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_set_config_round_trips_through_provider() {
        let store: ConfigStore<_, Settings> = ConfigStore::new(MemoryProvider::default(), YamlConfigSerializer);
        let settings = Settings { walls: 7, seed: Some(11), ..Settings::default() };
        store.set_config(&settings).unwrap();

        let reloaded: ConfigStore<_, Settings> = ConfigStore::new(
            MemoryProvider { content: RefCell::new(store.provider.get_config_content().unwrap()) },
            YamlConfigSerializer,
        );
        assert_eq!(reloaded.get_config().unwrap(), settings);
    }

    #[test]
    fn test_file_provider_missing_file() {
        let path = std::env::temp_dir().join(format!("snake-arena-missing-{}.yaml", std::process::id()));
        let provider = FileContentConfigProvider::new(&path);
        assert!(provider.get_config_content().unwrap().is_none());
    }
}
