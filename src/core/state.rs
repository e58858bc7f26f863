//! # Application State
//!
//! Core business state for Lingo. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── config: Configuration           // key, endpoint, region, connection string
//! ├── session: Session                // translator/telemetry handles + language pair
//! ├── catalog: LanguageCatalog        // languages from the last applied fetch
//! ├── source_text: String             // text to translate
//! ├── output: String                  // translation or error text
//! ├── output_is_error: bool
//! ├── status_message: String          // status bar text
//! ├── reconfiguring / translating / detecting: bool
//! ├── generation: u64                 // latest issued reconfiguration token
//! └── clients: Arc<dyn ClientFactory> // builds service clients
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::fmt;
use std::sync::Arc;

use crate::core::catalog::LanguageCatalog;
use crate::core::clients::ClientFactory;
use crate::core::config::ResolvedConfig;
use crate::core::credential::redact;
use crate::telemetry::TelemetrySink;
use crate::translator::TranslationService;
use crate::translator::azure::DEFAULT_ENDPOINT;

/// User-editable fields that gate session construction.
#[derive(Clone, Default, PartialEq)]
pub struct Configuration {
    /// Empty means the deployment default.
    pub endpoint: String,
    pub api_key: String,
    pub region: Option<String>,
    pub telemetry_connection_string: String,
}

impl Configuration {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            region: config.region.clone(),
            telemetry_connection_string: config.telemetry_connection_string.clone(),
        }
    }

    pub fn effective_endpoint(&self) -> &str {
        let trimmed = self.endpoint.trim();
        if trimmed.is_empty() { DEFAULT_ENDPOINT } else { trimmed }
    }

    pub fn get(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::ApiKey => &self.api_key,
            ConfigField::Endpoint => &self.endpoint,
            ConfigField::TelemetryConnectionString => &self.telemetry_connection_string,
        }
    }

    pub fn set(&mut self, field: ConfigField, value: String) {
        match field {
            ConfigField::ApiKey => self.api_key = value,
            ConfigField::Endpoint => self.endpoint = value,
            ConfigField::TelemetryConnectionString => self.telemetry_connection_string = value,
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("endpoint", &self.effective_endpoint())
            .field("api_key", &redact(&self.api_key))
            .field("region", &self.region)
            .field(
                "telemetry_enabled",
                &!self.telemetry_connection_string.trim().is_empty(),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    ApiKey,
    Endpoint,
    TelemetryConnectionString,
}

impl ConfigField {
    pub fn label(self) -> &'static str {
        match self {
            ConfigField::ApiKey => "API key",
            ConfigField::Endpoint => "Endpoint",
            ConfigField::TelemetryConnectionString => "Telemetry connection string",
        }
    }
}

/// Coarse session state. There is no transition back to `Unconfigured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unconfigured,
    Configured,
}

/// Live clients plus the selected language pair.
pub struct Session {
    pub translator: Option<Arc<dyn TranslationService>>,
    pub telemetry: Option<Arc<dyn TelemetrySink>>,
    pub source_language: String,
    pub target_language: String,
}

impl Session {
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            translator: None,
            telemetry: None,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.translator.is_some() {
            SessionPhase::Configured
        } else {
            SessionPhase::Unconfigured
        }
    }

    pub fn swap_languages(&mut self) {
        std::mem::swap(&mut self.source_language, &mut self.target_language);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase())
            .field("telemetry", &self.telemetry.as_ref().map(|t| t.stream_name()))
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .finish()
    }
}

pub struct App {
    pub config: Configuration,
    pub session: Session,
    pub catalog: LanguageCatalog,
    pub source_text: String,
    pub output: String,
    /// Set when `output` holds an error rather than a translation.
    pub output_is_error: bool,
    pub status_message: String,
    /// True while the most recently issued reconfiguration is in flight.
    pub reconfiguring: bool,
    pub translating: bool,
    pub detecting: bool,
    /// Token of the most recently issued reconfiguration.
    pub generation: u64,
    pub telemetry_stream: String,
    pub default_source_language: String,
    pub default_target_language: String,
    pub clients: Arc<dyn ClientFactory>,
}

impl App {
    pub fn new(clients: Arc<dyn ClientFactory>, config: &ResolvedConfig) -> Self {
        Self {
            config: Configuration::from_resolved(config),
            session: Session::new(&config.source_language, &config.target_language),
            catalog: LanguageCatalog::default(),
            source_text: String::new(),
            output: String::new(),
            output_is_error: false,
            status_message: String::from("Welcome to Lingo!"),
            reconfiguring: false,
            translating: false,
            detecting: false,
            generation: 0,
            telemetry_stream: config.telemetry_stream.clone(),
            default_source_language: config.source_language.clone(),
            default_target_language: config.target_language.clone(),
            clients,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.reconfiguring || self.translating || self.detecting
    }
}
