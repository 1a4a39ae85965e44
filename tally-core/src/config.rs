//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "activePerson": 1, "currency": "EUR", "database": "tally.duckdb" }
//! }
//! ```
//! Keys this crate does not know about are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::PersonId;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_DATABASE: &str = "tally.duckdb";
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Environment variable selecting the acting person
pub const ENV_PERSON: &str = "TALLY_PERSON";
/// Environment variable overriding the display currency
pub const ENV_CURRENCY: &str = "TALLY_CURRENCY";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_person: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Tally configuration (resolved view of settings and environment)
#[derive(Debug, Clone)]
pub struct Config {
    /// Person commands act as, if any
    pub active_person: Option<PersonId>,
    /// Display label for amounts; balances are always single-currency
    pub currency: String,
    /// Database file name, relative to the data directory
    pub database: String,
    // Raw file contents, written back on save
    raw: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_person: None,
            currency: DEFAULT_CURRENCY.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            raw: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory, applying environment overrides
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_with_env(dir, |key| std::env::var(key).ok())
    }

    /// Load config using `env` to look up overrides
    pub fn load_with_env(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        Self::resolve(raw, env)
    }

    fn resolve(raw: SettingsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let active_person = match env(ENV_PERSON).filter(|v| !v.trim().is_empty()) {
            Some(value) => Some(value.trim().parse::<PersonId>().map_err(|_| {
                Error::Config(format!("{} must be a person id, got {:?}", ENV_PERSON, value))
            })?),
            None => raw.app.active_person,
        };

        let currency = env(ENV_CURRENCY)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| raw.app.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let database = raw
            .app
            .database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Ok(Self {
            active_person,
            currency,
            database,
            raw,
        })
    }

    /// Save config to the data directory
    ///
    /// Only values changed through the setters are written; environment
    /// overrides never end up in the file.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.raw)?;
        std::fs::write(dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Remember `person_id` as the person commands act as
    pub fn set_active_person(&mut self, person_id: PersonId) {
        self.active_person = Some(person_id);
        self.raw.app.active_person = Some(person_id);
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        let currency = currency.into();
        self.currency = currency.clone();
        self.raw.app.currency = Some(currency);
    }

    /// Full path of the database file
    pub fn db_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_with_env(dir.path(), no_env).unwrap();

        assert_eq!(config.active_person, None);
        assert_eq!(config.currency, DEFAULT_CURRENCY);
        assert_eq!(config.db_path(dir.path()), dir.path().join(DEFAULT_DATABASE));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app": {"currency": "CHF", "theme": "dark"}, "plugins": {"x": 1}}"#,
        )
        .unwrap();

        let mut config = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(config.currency, "CHF");
        config.set_active_person(3);
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["activePerson"], 3);
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["plugins"]["x"], 1);

        let reloaded = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(reloaded.active_person, Some(3));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app": {"activePerson": 1}}"#).unwrap();

        let config = Config::load_with_env(dir.path(), |key| match key {
            ENV_PERSON => Some("7".to_string()),
            ENV_CURRENCY => Some("USD".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.active_person, Some(7));
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_env_override_is_not_saved() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app": {"activePerson": 1}}"#).unwrap();

        let config = Config::load_with_env(dir.path(), |key| {
            (key == ENV_PERSON).then(|| "9".to_string())
        })
        .unwrap();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(reloaded.active_person, Some(1));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let err = Config::load_with_env(dir.path(), |key| {
            (key == ENV_PERSON).then(|| "alice".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert!(matches!(
            Config::load_with_env(dir.path(), no_env),
            Err(Error::Config(_))
        ));
    }
}
