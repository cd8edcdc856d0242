use std::path::PathBuf;

use clinic_db_memory::GatewayConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if let Some(path) = &self.storage.snapshot_path {
            if path.as_os_str().is_empty() {
                return Err("storage.snapshot_path must not be empty".into());
            }
        }
        Ok(())
    }

    /// Snapshot location: configured path, else `<data dir>/clinic/clinic.json`.
    pub fn snapshot_path(&self) -> PathBuf {
        self.storage
            .snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::snapshot(self.snapshot_path())
    }
}

fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("clinic"))
        .unwrap_or_default()
        .join("clinic.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "warn".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                // Try default working-directory file
                let default_path = PathBuf::from("clinic.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., CLINIC__LOGGING__LEVEL=debug
        builder = builder.add_source(
            Environment::with_prefix("CLINIC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.logging.level, "warn");
        assert!(cfg.snapshot_path().ends_with("clinic.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("clinic.toml");
        let data = dir.path().join("records.json");

        let mut doc = toml::Table::new();
        let mut storage = toml::Table::new();
        storage.insert(
            "snapshot_path".into(),
            toml::Value::String(data.to_string_lossy().into_owned()),
        );
        let mut logging = toml::Table::new();
        logging.insert("level".into(), toml::Value::String("debug".into()));
        doc.insert("storage".into(), toml::Value::Table(storage));
        doc.insert("logging".into(), toml::Value::Table(logging));
        fs::write(&path, toml::to_string(&doc).unwrap()).expect("write toml");

        let cfg = loader::load_config(path.to_str()).expect("should parse config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.snapshot_path(), data);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("clinic.toml");
        fs::write(&path, "[logging]\nlevel = \"loud\"\n").expect("write toml");

        let err = loader::load_config(path.to_str()).unwrap_err();
        assert!(err.contains("logging.level"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = loader::load_config(Some("/definitely/not/here/clinic.toml")).unwrap_err();
        assert!(err.contains("not found"));
    }
}
