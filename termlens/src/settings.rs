//! Persisted user settings: the API credential and the model identifier.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::SettingsError;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Environment variable overriding the stored API key.
pub const API_KEY_ENV: &str = "TERMLENS_API_KEY";

/// Environment variable overriding the stored model.
pub const MODEL_ENV: &str = "TERMLENS_MODEL";

const API_KEY_PREFIX: &str = "sk-";

/// User settings read once per summarize request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// API credential for the completion endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

impl Settings {
    /// Creates settings with a key and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            model: model.into(),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the trimmed API key, failing when none is configured.
    pub fn api_key(&self) -> Result<&str, SettingsError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingApiKey)
    }

    /// Checks that a usable API key is present.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.api_key()?.starts_with(API_KEY_PREFIX) {
            Ok(())
        } else {
            Err(SettingsError::InvalidApiKey)
        }
    }

    /// Checks settings before they are stored. A missing key is accepted so
    /// the model can be saved on its own; a present key must be valid.
    pub fn validate_for_storage(&self) -> Result<(), SettingsError> {
        match self.api_key() {
            Err(SettingsError::MissingApiKey) => Ok(()),
            _ => self.validate(),
        }
    }

    /// Replaces fields with explicit overrides when present and non-empty.
    #[must_use]
    pub fn apply_overrides(mut self, api_key: Option<String>, model: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }

    /// Applies [`API_KEY_ENV`] and [`MODEL_ENV`] overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(std::env::var(API_KEY_ENV).ok(), std::env::var(MODEL_ENV).ok())
    }
}

/// Storage for [`Settings`].
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Loads the current settings.
    fn load(&self) -> Result<Settings, SettingsError>;

    /// Validates and persists settings.
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
    env_overrides: bool,
}

impl JsonSettingsStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_overrides: true,
        }
    }

    /// Creates a store at the platform config directory.
    #[must_use]
    pub fn at_default_location() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    /// Returns `<config dir>/termlens/settings.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("termlens").join("settings.json"))
    }

    /// Ignores environment overrides on load.
    #[must_use]
    pub fn without_env_overrides(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    /// Gets the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        let settings = match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                Settings::default()
            }
            Err(e) => return Err(self.io_error(e)),
        };

        Ok(if self.env_overrides {
            settings.with_env_overrides()
        } else {
            settings
        })
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        settings.validate_for_storage()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), model = %settings.model, "Settings saved");
        Ok(())
    }
}

/// In-memory settings, for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticSettingsStore {
    settings: RwLock<Settings>,
}

impl StaticSettingsStore {
    /// Creates a store holding `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl SettingsStore for StaticSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.settings.read().clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        settings.validate_for_storage()?;
        *self.settings.write() = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, "gpt-4.1-nano");
        assert!(matches!(settings.api_key(), Err(SettingsError::MissingApiKey)));
    }

    #[test]
    fn test_missing_key_message() {
        let err = Settings::default().with_api_key("   ").api_key().unwrap_err();
        assert_eq!(
            err.to_string(),
            "API key not configured. Please set it in the settings."
        );
    }

    #[test]
    fn test_validate_requires_prefix() {
        assert!(Settings::new("sk-abc", "gpt-4o").validate().is_ok());
        assert!(matches!(
            Settings::new("abc", "gpt-4o").validate(),
            Err(SettingsError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_overrides_skip_empty_values() {
        let settings = Settings::new("sk-stored", "gpt-4o")
            .apply_overrides(Some("sk-env".to_string()), Some(String::new()));
        assert_eq!(settings.api_key().unwrap(), "sk-env");
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", Settings::new("sk-secret", "gpt-4o"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_json_wire_shape() {
        let settings: Settings = serde_json::from_str(r#"{"apiKey": "sk-1"}"#).unwrap();
        assert_eq!(settings.api_key().unwrap(), "sk-1");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested").join("settings.json"))
            .without_env_overrides();

        assert_eq!(store.load().unwrap(), Settings::default());

        let settings = Settings::new("sk-test", "gpt-4o-mini");
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_json_store_rejects_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json")).without_env_overrides();

        let err = store.save(&Settings::new("not-a-key", "gpt-4o")).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidApiKey));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_json_store_saves_model_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json")).without_env_overrides();

        let settings = store
            .load()
            .unwrap()
            .apply_overrides(None, Some("gpt-4o".to_string()));
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.model, "gpt-4o");
        assert!(matches!(loaded.api_key(), Err(SettingsError::MissingApiKey)));
    }

    #[test]
    fn test_json_store_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::new(path).without_env_overrides();
        assert!(matches!(store.load(), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_static_store() {
        let store = StaticSettingsStore::new(Settings::default());
        store.save(&Settings::new("sk-1", "gpt-4.1")).unwrap();
        assert_eq!(store.load().unwrap().model, "gpt-4.1");
    }

    #[test]
    fn test_mock_store() {
        let mut store = MockSettingsStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Ok(Settings::new("sk-mock", "gpt-4o")));

        assert_eq!(store.load().unwrap().api_key().unwrap(), "sk-mock");
    }
}
