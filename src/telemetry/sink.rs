use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use crate::error::ServiceError;

/// Event Hubs accepts batches up to 1 MiB on standard tiers.
pub const DEFAULT_MAX_BATCH_BYTES: usize = 1024 * 1024;

/// One record per successful translation. Built, sent, dropped.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub operation: String,
    pub source_language: String,
    pub target_language: String,
    pub source_text: String,
    pub target_text: String,
}

impl TelemetryEvent {
    pub fn translate(from: &str, to: &str, source_text: &str, target_text: &str) -> Self {
        Self {
            operation: "translate".to_string(),
            source_language: from.to_string(),
            target_language: to.to_string(),
            source_text: source_text.to_string(),
            target_text: target_text.to_string(),
        }
    }
}

/// A size-bounded set of serialized events, sent as one request.
#[derive(Debug, Clone)]
pub struct EventBatch {
    bodies: Vec<String>,
    size_bytes: usize,
    max_size_bytes: usize,
}

impl EventBatch {
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            bodies: Vec::new(),
            size_bytes: 0,
            max_size_bytes,
        }
    }

    /// Adds the event if it fits. Returns false (batch unchanged) otherwise.
    pub fn try_add(&mut self, event: &TelemetryEvent) -> bool {
        let body = match serde_json::to_string(event) {
            Ok(body) => body,
            Err(e) => {
                debug!("Event failed to serialize: {}", e);
                return false;
            }
        };
        if self.size_bytes + body.len() > self.max_size_bytes {
            return false;
        }
        self.size_bytes += body.len();
        self.bodies.push(body);
        true
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Serialized event bodies, in insertion order.
    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }
}

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Name of the stream this sink is bound to.
    fn stream_name(&self) -> &str;

    /// Creates an empty batch sized for this sink.
    fn create_batch(&self) -> EventBatch;

    /// Sends every event in the batch in one request.
    async fn send_batch(&self, batch: EventBatch) -> Result<(), ServiceError>;
}

/// Sends a single event as a one-item batch.
pub async fn emit(sink: &dyn TelemetrySink, event: &TelemetryEvent) -> Result<(), ServiceError> {
    let mut batch = sink.create_batch();
    if !batch.try_add(event) {
        return Err(ServiceError::Config(format!(
            "telemetry event does not fit in a batch for stream '{}'",
            sink.stream_name()
        )));
    }
    sink.send_batch(batch).await
}
