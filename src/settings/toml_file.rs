//! TOML configuration file loading
//!
//! Top-level scalar entries become settings keys. Nested tables are
//! flattened with a dot separator (`[scanner] device = "x"` becomes
//! `scanner.device`), which lets a file group keys without the provider
//! caring about the layout.

use super::error::{SettingsError, SettingsResult};
use super::provider::{ConfigProvider, MemorySettings};
use std::path::{Path, PathBuf};

/// Settings loaded from a TOML file
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    source: Option<PathBuf>,
    values: MemorySettings,
}

impl TomlSettings {
    /// Default configuration path, e.g. `~/.config/Vaultscan/vaultscan.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Vaultscan").join("vaultscan.toml"))
    }

    /// Load the explicit file if given, otherwise the default file if it exists
    ///
    /// A user-specified file must exist; a missing default file yields empty settings.
    pub async fn discover(config_file: Option<PathBuf>) -> SettingsResult<Self> {
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(SettingsError::file_not_found(path));
                }
                Self::load(&path).await
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path).await,
                _ => {
                    log::debug!("No configuration file found; using built-in defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load and parse a configuration file
    pub async fn load(path: &Path) -> SettingsResult<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        let mut settings = Self::parse(&contents)
            .map_err(|e| SettingsError::parse(path.to_path_buf(), e))?;
        settings.source = Some(path.to_path_buf());
        log::debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let table = toml::from_str::<toml::Table>(contents)?;
        let mut values = MemorySettings::new();
        flatten_table("", &table, &mut values);
        Ok(Self {
            source: None,
            values,
        })
    }

    /// Path the settings were loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl ConfigProvider for TomlSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut MemorySettings) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::String(s) => out.set(&full_key, s.clone()),
            toml::Value::Integer(i) => out.set(&full_key, i.to_string()),
            toml::Value::Float(f) => out.set(&full_key, f.to_string()),
            toml::Value::Boolean(b) => out.set(&full_key, b.to_string()),
            toml::Value::Datetime(dt) => out.set(&full_key, dt.to_string()),
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out),
            toml::Value::Array(_) => {
                log::warn!("Ignoring array value for configuration key '{}'", full_key);
            }
        }
    }
}
