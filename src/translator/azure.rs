//! Azure Translator (v3 REST API) implementation.
//!
//! Endpoints used:
//! - `GET  /languages?scope=translation` (anonymous)
//! - `POST /detect`
//! - `POST /translate?from=..&to=..`
//!
//! Authenticated calls carry `Ocp-Apim-Subscription-Key`, plus
//! `Ocp-Apim-Subscription-Region` for regional/multi-service resources.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::translator::{
    Detection, Language, TranslatedItem, TranslationRequest, TranslationService,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
const API_VERSION: &str = "3.0";

// ============================================================================
// Translator REST Types
// ============================================================================

/// A single element of the request body array (the API wants `Text`).
#[derive(Serialize, Debug)]
struct TextInput<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

/// `GET /languages` response, restricted to the translation scope.
#[derive(Deserialize, Debug)]
struct LanguagesResponse {
    translation: HashMap<String, LanguageEntry>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LanguageEntry {
    name: String,
    native_name: String,
}

/// Error envelope: `{"error": {"code": 401000, "message": "..."}}`
#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct AzureTranslator {
    endpoint: String,
    key: String,
    region: Option<String>,
    client: reqwest::Client,
}

impl AzureTranslator {
    /// Builds a client. Fails if `endpoint` is not an http(s) URL.
    /// The key is not checked here; that is the controller's job.
    pub fn new(endpoint: &str, key: String, region: Option<String>) -> Result<Self, ServiceError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ServiceError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServiceError::Config(format!(
                "invalid endpoint '{endpoint}': expected http or https"
            )));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            region: region.filter(|r| !r.is_empty()),
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("X-ClientTraceId", uuid::Uuid::new_v4().to_string());
        match &self.region {
            Some(region) => builder.header("Ocp-Apim-Subscription-Region", region),
            None => builder,
        }
    }
}

/// Maps a non-success response to a `ServiceError`, passing the service's
/// own message through when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|env| env.error.message)
        .unwrap_or(body);
    warn!("Translator API error: {} - {}", status, message);

    match status.as_u16() {
        401 | 403 => Err(ServiceError::Unauthorized(message)),
        code => Err(ServiceError::Api {
            status: code,
            message,
        }),
    }
}

/// Reads the body and narrows it to `T`.
async fn parse_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::Network(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| {
        debug!("Unexpected response body: {}", body);
        ServiceError::Parse(format!("unexpected response shape: {e}"))
    })
}

#[async_trait]
impl TranslationService for AzureTranslator {
    fn name(&self) -> &str {
        "azure"
    }

    async fn list_languages(&self) -> Result<Vec<Language>, ServiceError> {
        info!("Fetching language catalog from {}", self.endpoint);

        // No key header: the languages resource is anonymous.
        let response = self
            .client
            .get(self.url("languages"))
            .query(&[("api-version", API_VERSION), ("scope", "translation")])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let parsed: LanguagesResponse = parse_body(check_status(response).await?).await?;
        debug!("Catalog contains {} languages", parsed.translation.len());

        Ok(parsed
            .translation
            .into_iter()
            .map(|(code, entry)| Language {
                code,
                name: entry.name,
                native_name: entry.native_name,
            })
            .collect())
    }

    async fn detect(&self, text: &str) -> Result<Detection, ServiceError> {
        debug!("Detect request: {} bytes", text.len());

        let response = self
            .authorized(self.client.post(self.url("detect")))
            .query(&[("api-version", API_VERSION)])
            .json(&[TextInput { text }])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let detections: Vec<Detection> = parse_body(check_status(response).await?).await?;
        detections
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Parse("detect returned no results".to_string()))
    }

    async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<Vec<TranslatedItem>, ServiceError> {
        info!(
            "Translate request: from={}, to={:?}, inputs={}",
            request.from,
            request.to,
            request.inputs.len()
        );

        let mut builder = self
            .authorized(self.client.post(self.url("translate")))
            .query(&[("api-version", API_VERSION), ("from", request.from)]);
        for target in request.to {
            builder = builder.query(&[("to", *target)]);
        }

        let body: Vec<TextInput> = request
            .inputs
            .iter()
            .map(|text| TextInput { text })
            .collect();

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        parse_body(check_status(response).await?).await
    }
}
