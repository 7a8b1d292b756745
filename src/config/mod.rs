//! Configuration module for semlink.
//!
//! Handles the config file, environment variable expansion and the mapping
//! onto generation options.

mod settings;

pub use settings::{expand_env_vars, GenerateSettings, Settings, SettingsError};
