//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::clients::ClientFactory;
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::error::ServiceError;
use crate::telemetry::{EventBatch, TelemetryEvent, TelemetrySink};
use crate::translator::{
    Detection, Language, TranslatedItem, Translation, TranslationRequest, TranslationService,
};

pub fn sample_languages() -> Vec<Language> {
    vec![
        Language::new("en", "English", "English"),
        Language::new("it", "Italian", "Italiano"),
        Language::new("de", "German", "Deutsch"),
        Language::new("fr", "French", "Français"),
    ]
}

/// (from, to, inputs) of a recorded translate call.
pub type RecordedRequest = (String, Vec<String>, Vec<String>);

/// In-memory translator that knows a couple of words.
pub struct MockTranslator {
    languages: Vec<Language>,
    translate_error: Option<ServiceError>,
    list_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    last_request: Mutex<Option<RecordedRequest>>,
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self {
            languages: sample_languages(),
            translate_error: None,
            list_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl MockTranslator {
    pub fn failing_translate(error: ServiceError) -> Self {
        Self {
            translate_error: Some(error),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

fn lookup(text: &str) -> String {
    match text {
        "hello" => "ciao".to_string(),
        "ciao" => "hello".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TranslationService for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.languages.clone())
    }

    async fn detect(&self, _text: &str) -> Result<Detection, ServiceError> {
        Ok(Detection {
            language: "de".to_string(),
            score: 0.9,
            is_translation_supported: true,
            is_transliteration_supported: false,
            alternatives: Vec::new(),
        })
    }

    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<Vec<TranslatedItem>, ServiceError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((
            request.from.to_string(),
            request.to.iter().map(|s| s.to_string()).collect(),
            request.inputs.iter().map(|s| s.to_string()).collect(),
        ));

        if let Some(error) = &self.translate_error {
            return Err(error.clone());
        }
        Ok(request
            .inputs
            .iter()
            .map(|input| TranslatedItem {
                translations: request
                    .to
                    .iter()
                    .map(|to| Translation {
                        text: lookup(input),
                        to: to.to_string(),
                    })
                    .collect(),
            })
            .collect())
    }
}

/// Records sent events; optionally fails every send.
#[derive(Default)]
pub struct MockSink {
    fail: bool,
    bodies: Mutex<Vec<String>>,
}

impl MockSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .map(|body| {
                let value: serde_json::Value = serde_json::from_str(body).unwrap();
                TelemetryEvent {
                    operation: value["operation"].as_str().unwrap().to_string(),
                    source_language: value["sourceLanguage"].as_str().unwrap().to_string(),
                    target_language: value["targetLanguage"].as_str().unwrap().to_string(),
                    source_text: value["sourceText"].as_str().unwrap().to_string(),
                    target_text: value["targetText"].as_str().unwrap().to_string(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl TelemetrySink for MockSink {
    fn stream_name(&self) -> &str {
        "mock"
    }

    fn create_batch(&self) -> EventBatch {
        EventBatch::new(crate::telemetry::DEFAULT_MAX_BATCH_BYTES)
    }

    async fn send_batch(&self, batch: EventBatch) -> Result<(), ServiceError> {
        if self.fail {
            return Err(ServiceError::Network("connection refused".to_string()));
        }
        self.bodies
            .lock()
            .unwrap()
            .extend(batch.bodies().iter().cloned());
        Ok(())
    }
}

/// Hands out the same mock clients on every build.
pub struct MockClients {
    pub translator: Arc<MockTranslator>,
    pub sink: Arc<MockSink>,
    pub fail_telemetry: bool,
    pub translator_builds: Arc<AtomicUsize>,
}

impl Default for MockClients {
    fn default() -> Self {
        Self {
            translator: Arc::new(MockTranslator::default()),
            sink: Arc::new(MockSink::default()),
            fail_telemetry: false,
            translator_builds: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ClientFactory for MockClients {
    fn translator(
        &self,
        _key: &str,
        _endpoint: &str,
        _region: Option<&str>,
    ) -> Result<Arc<dyn TranslationService>, ServiceError> {
        self.translator_builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.translator.clone())
    }

    fn telemetry(
        &self,
        _connection_string: &str,
        _stream: &str,
    ) -> Result<Arc<dyn TelemetrySink>, ServiceError> {
        if self.fail_telemetry {
            return Err(ServiceError::Config(
                "malformed connection string".to_string(),
            ));
        }
        Ok(self.sink.clone())
    }
}

pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        endpoint: String::new(),
        api_key: String::new(),
        region: None,
        telemetry_connection_string: String::new(),
        telemetry_stream: "translations".to_string(),
        source_language: "en".to_string(),
        target_language: "it".to_string(),
    }
}

/// Creates a test App backed by mock clients.
pub fn test_app() -> App {
    test_app_with(Arc::new(MockClients::default()))
}

pub fn test_app_with(clients: Arc<dyn ClientFactory>) -> App {
    App::new(clients, &test_config())
}
