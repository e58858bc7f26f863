//! # Telemetry
//!
//! Optional reporting of each successful translation to a remote event
//! stream. The core only sees [`TelemetrySink`]; [`EventHubProducer`] is the
//! Azure Event Hubs REST implementation.

pub mod event_hub;
pub mod sink;

pub use event_hub::{ConnectionString, EventHubProducer};
pub use sink::{DEFAULT_MAX_BATCH_BYTES, EventBatch, TelemetryEvent, TelemetrySink, emit};
