//! # Client Factory
//!
//! Builds the external service clients from user-supplied credentials.
//! The controller only ever goes through [`ClientFactory`], which is what
//! lets tests swap in mocks.

use std::sync::Arc;

use crate::error::ServiceError;
use crate::telemetry::{EventHubProducer, TelemetrySink};
use crate::translator::{AzureTranslator, TranslationService};

pub trait ClientFactory: Send + Sync {
    /// Builds a translator client. Only fails on local problems (bad URL).
    fn translator(
        &self,
        key: &str,
        endpoint: &str,
        region: Option<&str>,
    ) -> Result<Arc<dyn TranslationService>, ServiceError>;

    /// Builds a telemetry sink bound to `stream`.
    fn telemetry(
        &self,
        connection_string: &str,
        stream: &str,
    ) -> Result<Arc<dyn TelemetrySink>, ServiceError>;
}

/// Azure Translator + Azure Event Hubs.
pub struct AzureClients;

impl ClientFactory for AzureClients {
    fn translator(
        &self,
        key: &str,
        endpoint: &str,
        region: Option<&str>,
    ) -> Result<Arc<dyn TranslationService>, ServiceError> {
        let translator = AzureTranslator::new(endpoint, key.to_string(), region.map(str::to_string))?;
        Ok(Arc::new(translator))
    }

    fn telemetry(
        &self,
        connection_string: &str,
        stream: &str,
    ) -> Result<Arc<dyn TelemetrySink>, ServiceError> {
        let producer = EventHubProducer::from_connection_string(connection_string, stream)?;
        Ok(Arc::new(producer))
    }
}
