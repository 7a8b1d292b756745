//! TOML-based configuration for semlink.
//!
//! Supports a config file (semlink.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [generate]
//! input_dir = "models"
//! output_dir = "lookml"
//! schema = "${DBT_SCHEMA}"
//! view_prefix = ""
//! explore_prefix = ""
//! fact_models = ["rental_orders"]
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::generate::GenerateOptions;
use crate::semantic::Naming;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Generation settings.
    pub generate: GenerateSettings,
}

/// Generation settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Directory scanned for semantic model YAML.
    pub input_dir: Option<PathBuf>,

    /// Directory the generated files are written to.
    pub output_dir: Option<PathBuf>,

    /// Schema `ref('...')` tables resolve into (supports ${ENV_VAR} expansion).
    pub schema: Option<String>,

    /// Prefix for generated view names.
    pub view_prefix: String,

    /// Prefix for generated explore names.
    pub explore_prefix: String,

    /// Fact models to build explores for (empty: infer from foreign entities).
    pub fact_models: Vec<String>,
}

impl GenerateSettings {
    /// Get the schema with environment variables expanded.
    pub fn resolved_schema(&self) -> Result<Option<String>, SettingsError> {
        self.schema.as_deref().map(expand_env_vars).transpose()
    }

    /// Build generation options. A schema is required.
    pub fn to_options(&self) -> Result<GenerateOptions, SettingsError> {
        let schema = self
            .resolved_schema()?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SettingsError::InvalidConfig("schema is required".to_string()))?;

        Ok(GenerateOptions::default()
            .with_schema(schema)
            .with_naming(Naming::new(&self.view_prefix, &self.explore_prefix))
            .with_fact_models(self.fact_models.clone()))
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SEMLINK_CONFIG`
    /// 2. `./semlink.toml`
    /// 3. `~/.config/semlink/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SEMLINK_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("semlink.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("semlink").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
