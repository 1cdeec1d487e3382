use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use matriq_config::Config;
use matriq_core::{CapturedImage, TransportError};

/// Error body convention of the remote service.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Seam to the remote MatriQ service.
///
/// Implementations return the raw success body; typed decoding happens at
/// the call site via [`decode`]. No retries at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Vec<u8>, TransportError>;

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Vec<u8>, TransportError>;

    /// Multipart upload of a single image under the given field name.
    async fn upload(
        &self,
        path: &str,
        field: &str,
        image: &CapturedImage,
    ) -> Result<Vec<u8>, TransportError>;
}

/// Decode a success body into its declared payload type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(bytes).map_err(|e| TransportError::DecodeFailure(e.to_string()))
}

/// Map a non-success status to a typed failure, preserving the server's
/// `detail` message when the body carries one.
fn classify_status(code: u16, body: &[u8]) -> TransportError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);
    if (400..500).contains(&code) {
        TransportError::ClientStatus { code, detail }
    } else {
        TransportError::ServerStatus { code, detail }
    }
}

fn network(e: reqwest::Error) -> TransportError {
    TransportError::NetworkFailure(e.to_string())
}

/// Transport over reqwest against a fixed base URL.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    ///
    /// JSON requests use the configured request timeout; uploads override it
    /// per request since the remote recognition step is much slower.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(network)?;
        if status.is_success() {
            return Ok(bytes.to_vec());
        }
        Err(classify_status(status.as_u16(), &bytes))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        debug!(path = %path, "GET request");
        self.execute(self.client.get(self.url(path))).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Vec<u8>, TransportError> {
        debug!(path = %path, "POST request");
        self.execute(self.client.post(self.url(path)).json(&body)).await
    }

    async fn upload(
        &self,
        path: &str,
        field: &str,
        image: &CapturedImage,
    ) -> Result<Vec<u8>, TransportError> {
        debug!(path = %path, file = %image.file_name, size = image.bytes.len(), "uploading image");
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)
            .map_err(|e| TransportError::NetworkFailure(format!("invalid mime type: {e}")))?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);
        self.execute(
            self.client
                .post(self.url(path))
                .timeout(self.upload_timeout)
                .multipart(form),
        )
        .await
    }
}
