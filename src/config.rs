use crate::error::ArborError;
use std::collections::BTreeMap;
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};

/// Option name holding the note path opened on application start.
pub const OPTION_HOMEPAGE_NOTE_PATH: &str = "homepage_note_path";

/// Provider of persisted user options, injected into components that need
/// them rather than read from a global.
pub trait OptionsProvider: Send + Sync {
    fn get_option(&self, name: &str) -> Result<Option<String>, ArborError>;
    fn set_option(&self, name: &str, value: String) -> Result<(), ArborError>;

    /// The configured homepage note path, falling back to the root note when
    /// the option was never set.
    fn homepage_note_path(&self) -> Result<String, ArborError> {
        Ok(self
            .get_option(OPTION_HOMEPAGE_NOTE_PATH)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| crate::tree::ROOT_NOTE_ID.to_string()))
    }
}

#[derive(Debug)]
pub struct TomlOptionsProvider {
    path: PathBuf,
}

impl TomlOptionsProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlOptionsProvider { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ArborError> {
        tracing::debug!("Attempting to read options from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Options file not found, returning empty option map.");
            return Ok(BTreeMap::new());
        }
        let content = read_to_string(&self.path)?;
        let config: BTreeMap<String, BTreeMap<String, String>> = toml::from_str(&content)?;
        Ok(config.get("options").cloned().unwrap_or_default())
    }
}

impl OptionsProvider for TomlOptionsProvider {
    fn get_option(&self, name: &str) -> Result<Option<String>, ArborError> {
        Ok(self.read_all()?.get(name).cloned())
    }

    fn set_option(&self, name: &str, value: String) -> Result<(), ArborError> {
        tracing::debug!("Attempting to write option {name} to: {:?}", &self.path);
        let mut options = self.read_all()?;
        options.insert(name.to_string(), value);
        let mut config = BTreeMap::new();
        config.insert("options".to_string(), options);
        let toml_string = toml::to_string(&config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

/// In-memory provider for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryOptionsProvider {
    options: parking_lot::RwLock<BTreeMap<String, String>>,
}

impl MemoryOptionsProvider {
    pub fn with_option(name: &str, value: &str) -> Self {
        let provider = MemoryOptionsProvider::default();
        provider
            .options
            .write()
            .insert(name.to_string(), value.to_string());
        provider
    }
}

impl OptionsProvider for MemoryOptionsProvider {
    fn get_option(&self, name: &str) -> Result<Option<String>, ArborError> {
        Ok(self.options.read().get(name).cloned())
    }

    fn set_option(&self, name: &str, value: String) -> Result<(), ArborError> {
        self.options.write().insert(name.to_string(), value);
        Ok(())
    }
}
