//! Azure Event Hubs producer over the REST "send batch" endpoint.
//!
//! Authorization uses a Shared Access Signature derived from the
//! connection string:
//!
//! ```text
//! SharedAccessSignature sr=<uri>&sig=<base64 hmac-sha256>&se=<expiry>&skn=<key name>
//! ```
//!
//! where the signed string is `<url-encoded uri>\n<expiry>`.

use std::str::FromStr;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use log::{debug, info, warn};
use serde::Serialize;
use sha2::Sha256;

use crate::error::ServiceError;
use crate::telemetry::{DEFAULT_MAX_BATCH_BYTES, EventBatch, TelemetrySink};

const API_VERSION: &str = "2014-01";
const BATCH_CONTENT_TYPE: &str = "application/vnd.microsoft.servicebus.json";
const TOKEN_TTL_SECS: i64 = 3600;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Connection String
// ============================================================================

/// Parsed `Endpoint=...;SharedAccessKeyName=...;SharedAccessKey=...` string.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionString {
    /// Endpoint with `sb://` rewritten to `https://`, no trailing slash.
    pub endpoint: String,
    pub key_name: String,
    pub key: String,
    pub entity_path: Option<String>,
}

impl FromStr for ConnectionString {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut entity_path = None;

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Keys are base64 and may end in '=', so only split on the first one.
            let Some((name, value)) = part.split_once('=') else {
                return Err(ServiceError::Config(
                    "malformed connection string: expected Name=Value segments".to_string(),
                ));
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "sharedaccesskeyname" => key_name = Some(value.trim().to_string()),
                "sharedaccesskey" => key = Some(value.trim().to_string()),
                "entitypath" => entity_path = Some(value.trim().to_string()),
                other => debug!("Ignoring connection string field '{}'", other),
            }
        }

        let missing =
            |field: &str| ServiceError::Config(format!("connection string is missing {field}"));
        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| missing("Endpoint"))?;
        let key_name = key_name
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("SharedAccessKeyName"))?;
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("SharedAccessKey"))?;

        let endpoint = match endpoint.strip_prefix("sb://") {
            Some(rest) => format!("https://{rest}"),
            None => endpoint,
        };
        url::Url::parse(&endpoint)
            .map_err(|e| ServiceError::Config(format!("invalid Endpoint '{endpoint}': {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key_name,
            key,
            entity_path: entity_path.filter(|p| !p.is_empty()),
        })
    }
}

fn url_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Builds a SAS token for `resource_uri`, valid until `expiry` (unix seconds).
pub fn sas_token(
    resource_uri: &str,
    key_name: &str,
    key: &str,
    expiry: i64,
) -> Result<String, ServiceError> {
    let encoded_uri = url_encode(resource_uri);
    let string_to_sign = format!("{encoded_uri}\n{expiry}");

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| ServiceError::Config(format!("unusable shared access key: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}&skn={key_name}",
        url_encode(&signature)
    ))
}

// ============================================================================
// REST Types
// ============================================================================

/// One message in the batch body.
#[derive(Serialize, Debug)]
struct BatchMessage<'a> {
    #[serde(rename = "Body")]
    body: &'a str,
    #[serde(rename = "BrokerProperties")]
    broker_properties: BrokerProperties,
}

#[derive(Serialize, Debug)]
struct BrokerProperties {
    #[serde(rename = "MessageId")]
    message_id: String,
}

// ============================================================================
// Producer
// ============================================================================

pub struct EventHubProducer {
    connection: ConnectionString,
    stream: String,
    max_batch_bytes: usize,
    client: reqwest::Client,
}

impl EventHubProducer {
    /// Binds a producer to `stream`. The stream name wins over any
    /// `EntityPath` in the connection string.
    pub fn from_connection_string(connection_string: &str, stream: &str) -> Result<Self, ServiceError> {
        let connection: ConnectionString = connection_string.parse()?;
        if stream.trim().is_empty() {
            return Err(ServiceError::Config("telemetry stream name is empty".to_string()));
        }
        if let Some(path) = &connection.entity_path
            && path != stream
        {
            warn!("Connection string EntityPath '{}' differs from stream '{}', using the stream", path, stream);
        }

        info!("Telemetry bound to stream '{}' at {}", stream, connection.endpoint);
        Ok(Self {
            connection,
            stream: stream.to_string(),
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            client: reqwest::Client::new(),
        })
    }

    fn resource_uri(&self) -> String {
        format!("{}/{}", self.connection.endpoint, self.stream)
    }
}

#[async_trait]
impl TelemetrySink for EventHubProducer {
    fn stream_name(&self) -> &str {
        &self.stream
    }

    fn create_batch(&self) -> EventBatch {
        EventBatch::new(self.max_batch_bytes)
    }

    async fn send_batch(&self, batch: EventBatch) -> Result<(), ServiceError> {
        if batch.is_empty() {
            debug!("Skipping empty telemetry batch");
            return Ok(());
        }

        let messages: Vec<BatchMessage> = batch
            .bodies()
            .iter()
            .map(|body| BatchMessage {
                body,
                broker_properties: BrokerProperties {
                    message_id: uuid::Uuid::new_v4().to_string(),
                },
            })
            .collect();
        let payload = serde_json::to_string(&messages)
            .map_err(|e| ServiceError::Parse(format!("failed to encode batch: {e}")))?;

        let resource_uri = self.resource_uri();
        let expiry = chrono::Utc::now().timestamp() + TOKEN_TTL_SECS;
        let token = sas_token(
            &resource_uri,
            &self.connection.key_name,
            &self.connection.key,
            expiry,
        )?;

        debug!(
            "Sending telemetry batch: {} events, {} bytes",
            batch.len(),
            batch.size_bytes()
        );

        let response = self
            .client
            .post(format!("{resource_uri}/messages"))
            .query(&[("api-version", API_VERSION), ("timeout", "60")])
            .header("Authorization", token)
            .header("Content-Type", BATCH_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Telemetry send failed: {} - {}", status, message);
        match status.as_u16() {
            401 | 403 => Err(ServiceError::Unauthorized(message)),
            code => Err(ServiceError::Api {
                status: code,
                message,
            }),
        }
    }
}
