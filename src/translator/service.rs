use async_trait::async_trait;

use super::types::{Detection, Language, TranslatedItem};
use crate::error::ServiceError;

/// Everything the service needs to fulfil one translate call.
pub struct TranslationRequest<'a> {
    pub inputs: &'a [&'a str],
    pub from: &'a str,
    pub to: &'a [&'a str],
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Returns the name of the service backend.
    fn name(&self) -> &str;

    /// Lists the languages available for translation. Does not require a key.
    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError>;

    /// Detects the language of `text`.
    async fn detect(&self, text: &str) -> Result<Detection, ServiceError>;

    /// Translates every input into every target language.
    /// One `TranslatedItem` per input, in input order.
    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<Vec<TranslatedItem>, ServiceError>;
}
