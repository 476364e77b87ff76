//! Configuration provider trait and simple providers

use super::error::{SettingsError, SettingsResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Read-only key/value configuration source
///
/// Implementations must be cheap to query; the scanner reads the device and
/// command once per scan invocation.
pub trait ConfigProvider: Send + Sync {
    /// Raw value for `key`, or `None` when unset
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, falling back to `default` when unset
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Non-negative integer value for `key`
    fn get_u64(&self, key: &str) -> SettingsResult<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| SettingsError::invalid_value(key, format!("'{}' is not a whole number", raw))),
        }
    }

    /// Boolean value for `key` (`true`/`false`, `yes`/`no`, `1`/`0`)
    fn get_bool(&self, key: &str) -> SettingsResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Some(true)),
                "false" | "no" | "0" | "off" => Ok(Some(false)),
                _ => Err(SettingsError::invalid_value(
                    key,
                    format!("'{}' is not a boolean", raw),
                )),
            },
        }
    }

    /// Millisecond duration for `key`
    fn get_millis(&self, key: &str) -> SettingsResult<Option<Duration>> {
        Ok(self.get_u64(key)?.map(Duration::from_millis))
    }

    /// Second duration for `key`; zero means unset
    fn get_secs(&self, key: &str) -> SettingsResult<Option<Duration>> {
        Ok(self
            .get_u64(key)?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs))
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory settings, mainly for injection and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MemorySettings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ConfigProvider for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Overrides layered on top of a base provider
///
/// Command-line values take precedence over the configuration file.
pub struct LayeredSettings {
    overrides: MemorySettings,
    base: Arc<dyn ConfigProvider>,
}

impl LayeredSettings {
    pub fn new(overrides: MemorySettings, base: Arc<dyn ConfigProvider>) -> Self {
        Self { overrides, base }
    }
}

impl ConfigProvider for LayeredSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.overrides.get(key).or_else(|| self.base.get(key))
    }
}
