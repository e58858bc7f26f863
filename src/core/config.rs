//! # Configuration
//!
//! Centralizes startup settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.lingo/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! These are only the *initial* field values. The user can still edit the
//! key, endpoint, and connection string at runtime.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::catalog::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE};
use crate::translator::azure::DEFAULT_ENDPOINT;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LingoConfig {
    #[serde(default)]
    pub translator: TranslatorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TranslatorConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TelemetryConfig {
    pub connection_string: Option<String>,
    pub stream: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LanguagesConfig {
    pub source: Option<String>,
    pub target: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TELEMETRY_STREAM: &str = "translations";

// ============================================================================
// Resolved Config (concrete values, no Options except where optional)
// ============================================================================

#[derive(Clone)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub api_key: String,
    pub region: Option<String>,
    pub telemetry_connection_string: String,
    pub telemetry_stream: String,
    pub source_language: String,
    pub target_language: String,
}

// Secrets stay out of the log file.
impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("region", &self.region)
            .field(
                "telemetry_enabled",
                &!self.telemetry_connection_string.is_empty(),
            )
            .field("telemetry_stream", &self.telemetry_stream)
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .finish()
    }
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.lingo/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lingo").join("config.toml"))
}

/// Load config from `~/.lingo/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LingoConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<LingoConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(LingoConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(LingoConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<LingoConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: LingoConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!(
        "Config sections: translator.endpoint={:?}, telemetry.stream={:?}, languages={:?}",
        config.translator.endpoint, config.telemetry.stream, config.languages
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Lingo Configuration
# All settings are optional; defaults fill in anything left out.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [translator]
# endpoint = "https://api.cognitive.microsofttranslator.com"   # Or TRANSLATOR_ENDPOINT
# api_key = "0123456789abcdef0123456789abcdef"                  # Or TRANSLATOR_KEY (32 characters)
# region = "westeurope"                                         # Or TRANSLATOR_REGION

# [telemetry]
# connection_string = "Endpoint=sb://<namespace>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>"
# stream = "translations"                                       # Or TELEMETRY_STREAM

# [languages]
# source = "en"
# target = "it"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &LingoConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |name| std::env::var(name).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &LingoConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Endpoint: CLI → env → config → default
    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| env("TRANSLATOR_ENDPOINT"))
        .or_else(|| config.translator.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    // Key: env → config. Never on the command line (shell history).
    let api_key = env("TRANSLATOR_KEY")
        .or_else(|| config.translator.api_key.clone())
        .unwrap_or_default();

    let region = cli
        .region
        .clone()
        .or_else(|| env("TRANSLATOR_REGION"))
        .or_else(|| config.translator.region.clone())
        .filter(|r| !r.is_empty());

    let telemetry_connection_string = env("TELEMETRY_CONNECTION_STRING")
        .or_else(|| config.telemetry.connection_string.clone())
        .unwrap_or_default();

    let telemetry_stream = env("TELEMETRY_STREAM")
        .or_else(|| config.telemetry.stream.clone())
        .unwrap_or_else(|| DEFAULT_TELEMETRY_STREAM.to_string());

    let source_language = cli
        .from
        .clone()
        .or_else(|| config.languages.source.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());

    let target_language = cli
        .to
        .clone()
        .or_else(|| config.languages.target.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());

    ResolvedConfig {
        endpoint,
        api_key,
        region,
        telemetry_connection_string,
        telemetry_stream,
        source_language,
        target_language,
    }
}
