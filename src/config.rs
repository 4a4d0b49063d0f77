//! Configuration management
//!
//! Settings come from a JSON file in the user config dir (or an explicit
//! path), then environment variables, then command-line flags. Each layer
//! overrides the one before it.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::placement::{FolderRule, FolderRules};
use crate::engine::resolve::MergeStrategy;
use crate::error::{Error, Result};

// Environment variable names
pub const ENV_DB: &str = "CONTACTMERGE_DB";
pub const ENV_DEFAULT_FOLDER: &str = "CONTACTMERGE_DEFAULT_FOLDER";
pub const ENV_STRATEGY: &str = "CONTACTMERGE_STRATEGY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file to use instead of the default data-dir location
    pub database: Option<PathBuf>,
    /// Folder for contacts no rule matches. Empty means the default folder.
    pub default_folder: String,
    /// Company to folder rules, tried in order
    pub folder_rules: Vec<FolderRule>,
    pub strategy: MergeStrategy,
    pub interactive: bool,
    /// Extra CSV header to field mappings
    pub csv_columns: HashMap<String, String>,
}

impl Config {
    /// `<config_dir>/contactmerge/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("contactmerge").join("config.json"))
    }

    /// Load from `explicit` or the default location, then apply environment
    /// overrides. A missing default file is fine; a missing explicit one is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db) = get(ENV_DB) {
            self.database = Some(PathBuf::from(db));
        }
        if let Some(folder) = get(ENV_DEFAULT_FOLDER) {
            self.default_folder = folder.trim().to_string();
        }
        if let Some(strategy) = get(ENV_STRATEGY) {
            self.strategy = MergeStrategy::parse(&strategy).ok_or_else(|| {
                Error::Config(format!("{}: unknown strategy '{}'", ENV_STRATEGY, strategy))
            })?;
        }
        Ok(())
    }

    pub fn folder_rules(&self) -> FolderRules {
        FolderRules::new(self.folder_rules.clone(), self.default_folder.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::models::Contact;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.strategy, MergeStrategy::Skip);
        assert!(!config.interactive);
        assert!(config.default_folder.is_empty());
        assert!(config.folder_rules.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
  "default_folder": "Imported",
  "strategy": "merge",
  "folder_rules": [
    {{"company": "Acme", "folder": "Vendors"}},
    {{"company": "Globex", "folder": "Clients"}}
  ],
  "csv_columns": {{"Org": "company"}}
}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.default_folder, "Imported");
        assert_eq!(config.strategy, MergeStrategy::Merge);
        assert_eq!(config.folder_rules.len(), 2);
        assert_eq!(config.folder_rules[1].folder, "Clients");
        assert_eq!(config.csv_columns["Org"], "company");
        assert!(config.database.is_none());

        let mut c = Contact::new();
        c.company_name = Some("Acme".into());
        assert_eq!(config.folder_rules().place(&c), "Vendors");
        c.company_name = None;
        assert_eq!(config.folder_rules().place(&c), "Imported");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"strategy\": \"sometimes\"}}").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/contactmerge.json")));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            default_folder: "FromFile".into(),
            ..Config::default()
        };
        config
            .apply_env(env_of(&[
                (ENV_DB, "/tmp/other.db"),
                (ENV_DEFAULT_FOLDER, "FromEnv"),
                (ENV_STRATEGY, "Overwrite"),
            ]))
            .unwrap();

        assert_eq!(config.database, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.default_folder, "FromEnv");
        assert_eq!(config.strategy, MergeStrategy::Overwrite);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config {
            default_folder: "Keep".into(),
            ..Config::default()
        };
        config
            .apply_env(env_of(&[(ENV_DEFAULT_FOLDER, "  ")]))
            .unwrap();
        assert_eq!(config.default_folder, "Keep");
    }

    #[test]
    fn test_bad_env_strategy() {
        let mut config = Config::default();
        let result = config.apply_env(env_of(&[(ENV_STRATEGY, "yolo")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
