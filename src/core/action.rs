//! # Actions
//!
//! Everything that can happen in Lingo becomes an `Action`.
//! User presses Ctrl+T? That's `Action::Translate`.
//! The service answers? That's `Action::TranslationReceived(text)`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns an `Effect` describing the I/O to run
//! next. No network calls happen here; effect runners live in
//! `controller.rs` and report back with more actions.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                              │
//!                      Action  ←  run_effect() ┘
//! ```
//!
//! ## Reconfiguration tokens
//!
//! Every reconfiguration is issued a generation number. Outcomes carry it
//! back, and only the outcome matching the latest issued generation is
//! applied. A slow, older reconfiguration can therefore never overwrite a
//! newer one.

use log::{debug, info, warn};

use crate::core::controller::{DetectJob, ReconfigureOutcome, ReconfigureRequest, TranslateJob};
use crate::core::state::{App, ConfigField};
use crate::error::{ServiceError, SessionError};
use crate::translator::Detection;

#[derive(Debug)]
pub enum Action {
    /// Re-run reconfiguration with the current fields (startup, retry).
    Configure,
    /// A configuration field was committed with a new value.
    ConfigurationChanged(ConfigField, String),
    ReconfigureFinished(ReconfigureOutcome),
    SourceTextChanged(String),
    SelectSourceLanguage(String),
    SelectTargetLanguage(String),
    Translate,
    Swap,
    TranslationReceived(String),
    TranslationFailed(SessionError),
    TelemetryFailed(ServiceError),
    Detect,
    DetectionFinished(Result<Detection, SessionError>),
    Quit,
}

/// I/O requested by `update()`.
#[derive(Debug)]
pub enum Effect {
    None,
    Reconfigure(ReconfigureRequest),
    Translate(TranslateJob),
    Detect(DetectJob),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Configure => Effect::Reconfigure(begin_reconfiguration(app)),

        Action::ConfigurationChanged(field, value) => {
            if app.config.get(field) == value {
                debug!("{} unchanged, not reconfiguring", field.label());
                return Effect::None;
            }
            info!("{} changed", field.label());
            app.config.set(field, value);
            Effect::Reconfigure(begin_reconfiguration(app))
        }

        Action::ReconfigureFinished(outcome) => {
            apply_reconfiguration(app, outcome);
            Effect::None
        }

        Action::SourceTextChanged(text) => {
            app.source_text = text;
            Effect::None
        }

        Action::SelectSourceLanguage(code) => {
            if app.catalog.contains(&code) {
                app.session.source_language = code;
            } else {
                warn!("Ignoring unknown source language '{}'", code);
            }
            Effect::None
        }

        Action::SelectTargetLanguage(code) => {
            if app.catalog.contains(&code) {
                app.session.target_language = code;
            } else {
                warn!("Ignoring unknown target language '{}'", code);
            }
            Effect::None
        }

        Action::Translate => translate_effect(app),

        Action::Swap => {
            app.session.swap_languages();
            app.source_text = std::mem::take(&mut app.output);
            app.output_is_error = false;
            debug!(
                "Swapped languages: {} -> {}",
                app.session.source_language, app.session.target_language
            );
            translate_effect(app)
        }

        Action::TranslationReceived(text) => {
            app.translating = false;
            app.output = text;
            app.output_is_error = false;
            app.status_message = format!(
                "Translated {} → {}",
                app.catalog.display_name(&app.session.source_language),
                app.catalog.display_name(&app.session.target_language)
            );
            Effect::None
        }

        Action::TranslationFailed(e) => {
            app.translating = false;
            show_error(app, &e);
            app.status_message = "Translation failed".to_string();
            Effect::None
        }

        Action::TelemetryFailed(e) => {
            show_error(app, &e);
            app.status_message = "Telemetry failed".to_string();
            Effect::None
        }

        Action::Detect => {
            let Some(translator) = app.session.translator.clone() else {
                debug!("Detect ignored: session is unconfigured");
                return Effect::None;
            };
            if app.source_text.trim().is_empty() {
                debug!("Detect ignored: no source text");
                return Effect::None;
            }
            app.detecting = true;
            app.status_message = "Detecting language...".to_string();
            Effect::Detect(DetectJob {
                translator,
                text: app.source_text.clone(),
            })
        }

        Action::DetectionFinished(result) => {
            app.detecting = false;
            match result {
                Ok(detection) => apply_detection(app, detection),
                Err(e) => {
                    show_error(app, &e);
                    app.status_message = "Detection failed".to_string();
                }
            }
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// Issues a new generation and snapshots everything the runner needs.
fn begin_reconfiguration(app: &mut App) -> ReconfigureRequest {
    app.generation += 1;
    app.reconfiguring = true;
    app.status_message = "Connecting...".to_string();
    debug!(
        "Reconfiguration {} issued: {:?}",
        app.generation, app.config
    );
    ReconfigureRequest {
        generation: app.generation,
        config: app.config.clone(),
        stream: app.telemetry_stream.clone(),
        clients: app.clients.clone(),
    }
}

fn apply_reconfiguration(app: &mut App, outcome: ReconfigureOutcome) {
    if outcome.generation != app.generation {
        info!(
            "Discarding stale reconfiguration {} (latest is {})",
            outcome.generation, app.generation
        );
        return;
    }
    app.reconfiguring = false;

    // The catalog is applied even when the credential check failed afterwards.
    if let Some(catalog) = outcome.catalog {
        app.session.source_language = catalog
            .preserve_or(&app.session.source_language, &app.default_source_language)
            .to_string();
        app.session.target_language = catalog
            .preserve_or(&app.session.target_language, &app.default_target_language)
            .to_string();
        app.catalog = catalog;
    }

    match outcome.result {
        Ok(clients) => {
            info!(
                "Session configured (translator: {}, telemetry: {})",
                clients.translator.name(),
                clients
                    .telemetry
                    .as_ref()
                    .map(|t| t.stream_name())
                    .unwrap_or("off")
            );
            app.session.translator = Some(clients.translator);
            app.session.telemetry = clients.telemetry;
            app.output.clear();
            app.output_is_error = false;
            app.status_message = format!("Ready ({} languages)", app.catalog.len());
        }
        Err(e) => {
            // Previous clients, if any, stay live.
            warn!("Reconfiguration {} failed: {}", outcome.generation, e);
            show_error(app, &e);
            app.status_message = match e {
                SessionError::CredentialRequired => {
                    format!("{} languages available, key required", app.catalog.len())
                }
                _ => "Configuration failed".to_string(),
            };
        }
    }
}

fn show_error(app: &mut App, error: &dyn std::fmt::Display) {
    app.output = error.to_string();
    app.output_is_error = true;
}

/// Builds the translate effect, or nothing when no translator is live.
fn translate_effect(app: &mut App) -> Effect {
    let Some(translator) = app.session.translator.clone() else {
        debug!("Translate ignored: session is unconfigured");
        return Effect::None;
    };
    app.translating = true;
    app.status_message = "Translating...".to_string();
    Effect::Translate(TranslateJob {
        translator,
        telemetry: app.session.telemetry.clone(),
        text: app.source_text.clone(),
        from: app.session.source_language.clone(),
        to: app.session.target_language.clone(),
    })
}

fn apply_detection(app: &mut App, detection: Detection) {
    let name = app.catalog.display_name(&detection.language).to_string();
    let confidence = (detection.score * 100.0).round() as u32;

    if detection.is_translation_supported && app.catalog.contains(&detection.language) {
        app.session.source_language = detection.language.clone();
        app.status_message = format!("Detected {name} ({confidence}%), set as source");
    } else {
        app.status_message =
            format!("Detected '{}' ({confidence}%), not available for translation", detection.language);
    }
    info!("{}", app.status_message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::LanguageCatalog;
    use crate::core::controller::ConfiguredClients;
    use crate::core::state::SessionPhase;
    use crate::test_support::{MockTranslator, sample_languages, test_app};
    use std::sync::Arc;

    fn outcome(
        generation: u64,
        catalog: Option<LanguageCatalog>,
        result: Result<ConfiguredClients, SessionError>,
    ) -> ReconfigureOutcome {
        ReconfigureOutcome {
            generation,
            catalog,
            result,
        }
    }

    fn configured_clients() -> ConfiguredClients {
        ConfiguredClients {
            translator: Arc::new(MockTranslator::default()),
            telemetry: None,
        }
    }

    #[test]
    fn test_configure_issues_increasing_generations() {
        let mut app = test_app();
        let first = update(&mut app, Action::Configure);
        let second = update(&mut app, Action::Configure);
        match (first, second) {
            (Effect::Reconfigure(a), Effect::Reconfigure(b)) => {
                assert_eq!(a.generation, 1);
                assert_eq!(b.generation, 2);
            }
            other => panic!("Expected two Reconfigure effects, got {:?}", other),
        }
        assert!(app.reconfiguring);
    }

    #[test]
    fn test_unchanged_field_does_not_reconfigure() {
        let mut app = test_app();
        app.config.api_key = "k".repeat(32);
        let effect = update(
            &mut app,
            Action::ConfigurationChanged(ConfigField::ApiKey, "k".repeat(32)),
        );
        assert!(matches!(effect, Effect::None));
        assert_eq!(app.generation, 0);
    }

    #[test]
    fn test_changed_field_is_stored_and_reconfigures() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::ConfigurationChanged(ConfigField::Endpoint, "https://x.example".to_string()),
        );
        match effect {
            Effect::Reconfigure(request) => {
                assert_eq!(request.config.endpoint, "https://x.example");
            }
            other => panic!("Expected Reconfigure, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut app = test_app();
        update(&mut app, Action::Configure);
        update(&mut app, Action::Configure);

        let catalog = LanguageCatalog::new(sample_languages());
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(1, Some(catalog), Ok(configured_clients()))),
        );

        assert_eq!(app.phase(), SessionPhase::Unconfigured);
        assert!(app.catalog.is_empty());
        assert!(app.reconfiguring);
    }

    #[test]
    fn test_latest_outcome_is_applied() {
        let mut app = test_app();
        app.output = "old output".to_string();
        update(&mut app, Action::Configure);

        let catalog = LanguageCatalog::new(sample_languages());
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(1, Some(catalog), Ok(configured_clients()))),
        );

        assert_eq!(app.phase(), SessionPhase::Configured);
        assert!(app.output.is_empty());
        assert!(!app.reconfiguring);
        assert!(!app.catalog.is_empty());
    }

    #[test]
    fn test_credential_required_still_populates_catalog() {
        let mut app = test_app();
        update(&mut app, Action::Configure);

        let catalog = LanguageCatalog::new(sample_languages());
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(
                1,
                Some(catalog),
                Err(SessionError::CredentialRequired),
            )),
        );

        assert_eq!(app.phase(), SessionPhase::Unconfigured);
        assert_eq!(app.catalog.len(), sample_languages().len());
        assert_eq!(app.output, SessionError::CredentialRequired.to_string());
    }

    #[test]
    fn test_failed_reconfiguration_keeps_previous_translator() {
        let mut app = test_app();
        update(&mut app, Action::Configure);
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(
                1,
                Some(LanguageCatalog::new(sample_languages())),
                Ok(configured_clients()),
            )),
        );
        assert_eq!(app.phase(), SessionPhase::Configured);

        update(&mut app, Action::Configure);
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(
                2,
                None,
                Err(SessionError::InvalidCredential { length: 10 }),
            )),
        );

        assert_eq!(app.phase(), SessionPhase::Configured);
        assert!(app.output.contains("expected 32 characters"));
    }

    #[test]
    fn test_catalog_preserves_or_defaults_selection() {
        let mut app = test_app();
        app.session.source_language = "de".to_string();
        app.session.target_language = "xx".to_string();
        update(&mut app, Action::Configure);
        update(
            &mut app,
            Action::ReconfigureFinished(outcome(
                1,
                Some(LanguageCatalog::new(sample_languages())),
                Err(SessionError::CredentialRequired),
            )),
        );
        assert_eq!(app.session.source_language, "de");
        assert_eq!(app.session.target_language, "it");
    }

    #[test]
    fn test_translate_while_unconfigured_is_silent_noop() {
        let mut app = test_app();
        app.output = "untouched".to_string();
        let effect = update(&mut app, Action::Translate);
        assert!(matches!(effect, Effect::None));
        assert_eq!(app.output, "untouched");
        assert!(!app.translating);
    }

    #[test]
    fn test_swap_is_self_inverse_on_languages() {
        let mut app = test_app();
        let (source, target) = (
            app.session.source_language.clone(),
            app.session.target_language.clone(),
        );
        update(&mut app, Action::Swap);
        assert_eq!(app.session.source_language, target);
        update(&mut app, Action::Swap);
        assert_eq!(app.session.source_language, source);
        assert_eq!(app.session.target_language, target);
    }

    #[test]
    fn test_swap_moves_output_into_source() {
        let mut app = test_app();
        app.source_text = "hello".to_string();
        app.output = "ciao".to_string();
        update(&mut app, Action::Swap);
        assert_eq!(app.source_text, "ciao");
        assert!(app.output.is_empty());
    }

    #[test]
    fn test_select_language_rejects_codes_outside_catalog() {
        let mut app = test_app();
        app.catalog = LanguageCatalog::new(sample_languages());
        update(&mut app, Action::SelectTargetLanguage("de".to_string()));
        assert_eq!(app.session.target_language, "de");
        update(&mut app, Action::SelectTargetLanguage("tlh".to_string()));
        assert_eq!(app.session.target_language, "de");
    }

    #[test]
    fn test_telemetry_failure_overwrites_output() {
        let mut app = test_app();
        update(&mut app, Action::TranslationReceived("ciao".to_string()));
        assert_eq!(app.output, "ciao");
        update(
            &mut app,
            Action::TelemetryFailed(ServiceError::Network("refused".to_string())),
        );
        assert_eq!(app.output, "network error: refused");
        assert!(app.output_is_error);
    }

    #[test]
    fn test_detection_sets_source_when_supported() {
        let mut app = test_app();
        app.catalog = LanguageCatalog::new(sample_languages());
        let detection = Detection {
            language: "de".to_string(),
            score: 0.97,
            is_translation_supported: true,
            is_transliteration_supported: false,
            alternatives: Vec::new(),
        };
        update(&mut app, Action::DetectionFinished(Ok(detection)));
        assert_eq!(app.session.source_language, "de");
        assert!(app.status_message.contains("German"));
        assert!(app.status_message.contains("97%"));
    }

    #[test]
    fn test_detect_requires_source_text() {
        let mut app = test_app();
        app.session.translator = Some(Arc::new(MockTranslator::default()));
        assert!(matches!(update(&mut app, Action::Detect), Effect::None));
        app.source_text = "Guten Tag".to_string();
        assert!(matches!(update(&mut app, Action::Detect), Effect::Detect(_)));
    }
}
