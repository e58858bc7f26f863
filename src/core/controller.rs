//! # Session Controller
//!
//! Effect runners for the I/O that `update()` asks for, plus a small
//! headless driver used by the CLI and the integration tests.
//!
//! Runners never touch `App` directly. They own a snapshot of what they
//! need and report back with `Action`s over a channel, the same way the
//! TUI event loop consumes results from spawned tasks.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, mpsc};

use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::catalog::LanguageCatalog;
use crate::core::clients::ClientFactory;
use crate::core::credential::{effective_key, validate_key};
use crate::core::state::{App, ConfigField, Configuration};
use crate::error::{ServiceError, SessionError};
use crate::telemetry::{TelemetryEvent, TelemetrySink, emit};
use crate::translator::{TranslatedItem, TranslationRequest, TranslationService};

// ============================================================================
// Reconfiguration
// ============================================================================

/// Snapshot handed to [`reconfigure`].
pub struct ReconfigureRequest {
    pub generation: u64,
    pub config: Configuration,
    pub stream: String,
    pub clients: Arc<dyn ClientFactory>,
}

impl fmt::Debug for ReconfigureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconfigureRequest")
            .field("generation", &self.generation)
            .field("config", &self.config)
            .field("stream", &self.stream)
            .finish()
    }
}

/// Clients ready to be committed into the session.
pub struct ConfiguredClients {
    pub translator: Arc<dyn TranslationService>,
    pub telemetry: Option<Arc<dyn TelemetrySink>>,
}

pub struct ReconfigureOutcome {
    pub generation: u64,
    /// Present whenever the catalog fetch succeeded, even if a later step failed.
    pub catalog: Option<LanguageCatalog>,
    pub result: Result<ConfiguredClients, SessionError>,
}

impl fmt::Debug for ReconfigureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconfigureOutcome")
            .field("generation", &self.generation)
            .field("catalog", &self.catalog.as_ref().map(LanguageCatalog::len))
            .field("result", &self.result.as_ref().map(|_| "clients"))
            .finish()
    }
}

/// Runs the reconfiguration sequence. Nothing here is retried.
pub async fn reconfigure(request: ReconfigureRequest) -> ReconfigureOutcome {
    let generation = request.generation;
    let mut catalog = None;
    let result = build_clients(&request, &mut catalog).await;
    if let Err(e) = &result {
        debug!("Reconfiguration {} stopped: {}", generation, e);
    }
    ReconfigureOutcome {
        generation,
        catalog,
        result,
    }
}

async fn build_clients(
    request: &ReconfigureRequest,
    catalog: &mut Option<LanguageCatalog>,
) -> Result<ConfiguredClients, SessionError> {
    let config = &request.config;

    let key = effective_key(&config.api_key);
    validate_key(key)?;

    let translator =
        request
            .clients
            .translator(key, config.effective_endpoint(), config.region.as_deref())?;

    let languages = translator.list_languages().await?;
    info!("Fetched {} languages", languages.len());
    *catalog = Some(LanguageCatalog::new(languages));

    if config.api_key.is_empty() {
        return Err(SessionError::CredentialRequired);
    }

    let connection_string = config.telemetry_connection_string.trim();
    let telemetry = if connection_string.is_empty() {
        None
    } else {
        Some(request.clients.telemetry(connection_string, &request.stream)?)
    };

    Ok(ConfiguredClients {
        translator,
        telemetry,
    })
}

// ============================================================================
// Translation & Detection
// ============================================================================

pub struct TranslateJob {
    pub translator: Arc<dyn TranslationService>,
    pub telemetry: Option<Arc<dyn TelemetrySink>>,
    pub text: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for TranslateJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslateJob")
            .field("translator", &self.translator.name())
            .field("telemetry", &self.telemetry.is_some())
            .field("text_len", &self.text.len())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

fn first_translation(items: Vec<TranslatedItem>) -> Result<String, ServiceError> {
    items
        .into_iter()
        .next()
        .and_then(|item| item.translations.into_iter().next())
        .map(|t| t.text)
        .ok_or_else(|| ServiceError::Parse("response contained no translations".to_string()))
}

/// Translates, reports the text, then emits telemetry if a sink is set.
pub async fn run_translation(job: TranslateJob, tx: &mpsc::Sender<Action>) {
    let inputs = [job.text.as_str()];
    let targets = [job.to.as_str()];
    let request = TranslationRequest {
        inputs: &inputs,
        from: &job.from,
        to: &targets,
    };

    let translated = match job.translator.translate(request).await.and_then(first_translation) {
        Ok(text) => text,
        Err(e) => {
            warn!("Translation {} -> {} failed: {}", job.from, job.to, e);
            send(tx, Action::TranslationFailed(e.into()));
            return;
        }
    };
    send(tx, Action::TranslationReceived(translated.clone()));

    if let Some(sink) = job.telemetry {
        let event = TelemetryEvent::translate(&job.from, &job.to, &job.text, &translated);
        match emit(sink.as_ref(), &event).await {
            Ok(()) => debug!("Telemetry sent to '{}'", sink.stream_name()),
            Err(e) => {
                warn!("Telemetry send failed: {}", e);
                send(tx, Action::TelemetryFailed(e));
            }
        }
    }
}

pub struct DetectJob {
    pub translator: Arc<dyn TranslationService>,
    pub text: String,
}

impl fmt::Debug for DetectJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectJob")
            .field("translator", &self.translator.name())
            .field("text_len", &self.text.len())
            .finish()
    }
}

pub async fn run_detection(job: DetectJob, tx: &mpsc::Sender<Action>) {
    let result = job.translator.detect(&job.text).await.map_err(SessionError::from);
    send(tx, Action::DetectionFinished(result));
}

/// Runs one effect to completion, reporting results on `tx`.
pub async fn run_effect(effect: Effect, tx: mpsc::Sender<Action>) {
    match effect {
        Effect::Reconfigure(request) => {
            let outcome = reconfigure(request).await;
            send(&tx, Action::ReconfigureFinished(outcome));
        }
        Effect::Translate(job) => run_translation(job, &tx).await,
        Effect::Detect(job) => run_detection(job, &tx).await,
        Effect::None | Effect::Quit => {}
    }
}

fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Dropped action: receiver is gone");
    }
}

// ============================================================================
// Headless driver
// ============================================================================

/// Drives `update()` and its effects sequentially, without a UI.
///
/// Each `dispatch` runs the action and every effect it causes to
/// completion before returning.
pub struct SessionController {
    app: App,
}

impl SessionController {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub async fn dispatch(&mut self, action: Action) {
        let (tx, rx) = mpsc::channel();
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            debug!("Dispatching {:?}", action);
            let effect = update(&mut self.app, action);
            run_effect(effect, tx.clone()).await;
            queue.extend(rx.try_iter());
        }
    }

    /// Re-runs reconfiguration with the current fields.
    pub async fn on_configuration_changed(&mut self) {
        self.dispatch(Action::Configure).await;
    }

    pub async fn set_field(&mut self, field: ConfigField, value: impl Into<String>) {
        self.dispatch(Action::ConfigurationChanged(field, value.into()))
            .await;
    }

    pub async fn translate(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SourceTextChanged(text.into())).await;
        self.dispatch(Action::Translate).await;
    }

    pub async fn swap(&mut self) {
        self.dispatch(Action::Swap).await;
    }

    pub async fn detect(&mut self) {
        self.dispatch(Action::Detect).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SessionPhase;
    use crate::test_support::{MockClients, MockSink, MockTranslator, test_app_with};

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn controller(clients: MockClients) -> SessionController {
        SessionController::new(test_app_with(Arc::new(clients)))
    }

    #[tokio::test]
    async fn test_short_key_fails_before_any_client_is_built() {
        let clients = MockClients::default();
        let builds = clients.translator_builds.clone();
        let mut controller = controller(clients);

        controller.set_field(ConfigField::ApiKey, "0123456789").await;

        let app = controller.app();
        assert_eq!(app.phase(), SessionPhase::Unconfigured);
        assert_eq!(
            app.output,
            "invalid API key: expected 32 characters, got 10"
        );
        assert_eq!(builds.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_key_populates_catalog_then_requires_credential() {
        let clients = MockClients::default();
        let translator = clients.translator.clone();
        let mut controller = controller(clients);

        controller.on_configuration_changed().await;

        let app = controller.app();
        assert_eq!(app.phase(), SessionPhase::Unconfigured);
        assert!(!app.catalog.is_empty());
        assert_eq!(app.output, SessionError::CredentialRequired.to_string());
        assert_eq!(translator.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_valid_key_configures_session() {
        let mut controller = controller(MockClients::default());
        controller.app_mut().output = "stale".to_string();

        controller.set_field(ConfigField::ApiKey, KEY).await;

        let app = controller.app();
        assert_eq!(app.phase(), SessionPhase::Configured);
        assert!(app.session.telemetry.is_none());
        assert!(app.output.is_empty());
        assert!(!app.reconfiguring);
    }

    #[tokio::test]
    async fn test_translate_displays_first_translation() {
        let clients = MockClients::default();
        let translator = clients.translator.clone();
        let mut controller = controller(clients);
        controller.set_field(ConfigField::ApiKey, KEY).await;

        controller.translate("hello").await;

        assert_eq!(controller.app().output, "ciao");
        let (from, to, text) = translator.last_request().unwrap();
        assert_eq!(from, "en");
        assert_eq!(to, vec!["it".to_string()]);
        assert_eq!(text, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_translate_when_unconfigured_makes_no_call() {
        let clients = MockClients::default();
        let translator = clients.translator.clone();
        let mut controller = controller(clients);

        controller.translate("hello").await;

        assert_eq!(translator.translate_calls(), 0);
        assert!(controller.app().output.is_empty());
    }

    #[tokio::test]
    async fn test_translate_emits_one_telemetry_event() {
        let clients = MockClients::default();
        let sink = clients.sink.clone();
        let mut controller = controller(clients);
        controller
            .set_field(
                ConfigField::TelemetryConnectionString,
                "Endpoint=sb://x/;SharedAccessKeyName=a;SharedAccessKey=b",
            )
            .await;
        controller.set_field(ConfigField::ApiKey, KEY).await;
        assert!(controller.app().session.telemetry.is_some());

        controller.translate("hello").await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source_text, "hello");
        assert_eq!(events[0].target_text, "ciao");
        assert_eq!(events[0].target_language, "it");
    }

    #[tokio::test]
    async fn test_telemetry_failure_overwrites_translation() {
        let clients = MockClients {
            sink: Arc::new(MockSink::failing()),
            ..Default::default()
        };
        let mut controller = controller(clients);
        controller
            .set_field(
                ConfigField::TelemetryConnectionString,
                "Endpoint=sb://x/;SharedAccessKeyName=a;SharedAccessKey=b",
            )
            .await;
        controller.set_field(ConfigField::ApiKey, KEY).await;

        controller.translate("hello").await;

        assert!(controller.app().output.starts_with("network error"));
    }

    #[tokio::test]
    async fn test_bad_connection_string_aborts_reconfiguration() {
        let clients = MockClients {
            fail_telemetry: true,
            ..Default::default()
        };
        let mut controller = controller(clients);
        controller
            .set_field(ConfigField::TelemetryConnectionString, "garbage")
            .await;
        controller.set_field(ConfigField::ApiKey, KEY).await;

        let app = controller.app();
        assert_eq!(app.phase(), SessionPhase::Unconfigured);
        assert!(app.output.starts_with("config error"));
    }

    #[tokio::test]
    async fn test_swap_translates_previous_output_back() {
        let clients = MockClients::default();
        let translator = clients.translator.clone();
        let mut controller = controller(clients);
        controller.set_field(ConfigField::ApiKey, KEY).await;
        controller.translate("hello").await;

        controller.swap().await;

        let (from, to, text) = translator.last_request().unwrap();
        assert_eq!(from, "it");
        assert_eq!(to, vec!["en".to_string()]);
        assert_eq!(text, vec!["ciao".to_string()]);
        assert_eq!(controller.app().source_text, "ciao");
    }

    #[tokio::test]
    async fn test_translation_error_is_displayed() {
        let clients = MockClients {
            translator: Arc::new(MockTranslator::failing_translate(ServiceError::Api {
                status: 400,
                message: "The target language is not valid.".to_string(),
            })),
            ..Default::default()
        };
        let mut controller = controller(clients);
        controller.set_field(ConfigField::ApiKey, KEY).await;

        controller.translate("hello").await;

        assert_eq!(
            controller.app().output,
            "API error (HTTP 400): The target language is not valid."
        );
        assert!(!controller.app().translating);
    }

    #[tokio::test]
    async fn test_failed_translation_sends_no_telemetry() {
        let clients = MockClients {
            translator: Arc::new(MockTranslator::failing_translate(ServiceError::Network(
                "down".to_string(),
            ))),
            ..Default::default()
        };
        let sink = clients.sink.clone();
        let mut controller = controller(clients);
        controller
            .set_field(
                ConfigField::TelemetryConnectionString,
                "Endpoint=sb://x/;SharedAccessKeyName=a;SharedAccessKey=b",
            )
            .await;
        controller.set_field(ConfigField::ApiKey, KEY).await;
        assert!(controller.app().session.telemetry.is_some());

        controller.translate("hello").await;

        assert_eq!(controller.app().output, "network error: down");
        assert!(controller.app().output_is_error);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_detect_sets_source_language() {
        let mut controller = controller(MockClients::default());
        controller.set_field(ConfigField::ApiKey, KEY).await;
        controller
            .dispatch(Action::SourceTextChanged("Guten Morgen".to_string()))
            .await;

        controller.detect().await;

        assert_eq!(controller.app().session.source_language, "de");
    }

    #[tokio::test]
    async fn test_reconfigure_reports_catalog_with_credential_error() {
        let clients: Arc<dyn ClientFactory> = Arc::new(MockClients::default());
        let outcome = reconfigure(ReconfigureRequest {
            generation: 7,
            config: Configuration::default(),
            stream: "translations".to_string(),
            clients,
        })
        .await;

        assert_eq!(outcome.generation, 7);
        assert!(outcome.catalog.is_some());
        assert!(matches!(outcome.result, Err(SessionError::CredentialRequired)));
    }
}
