//! Settings Component
//!
//! Read-only configuration provider consumed by the scanner and the front
//! end. Values come from a TOML file, command-line overrides or an
//! in-memory map; every provider answers the same narrow `get(key)` query.

pub mod error;
pub mod keys;
pub mod provider;
pub mod toml_file;

pub use error::{SettingsError, SettingsResult};
pub use keys::*;
pub use provider::{ConfigProvider, LayeredSettings, MemorySettings};
pub use toml_file::TomlSettings;
