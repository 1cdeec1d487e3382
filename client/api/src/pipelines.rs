use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use matriq_core::{Pipeline, TransportError, ValidationError};
use matriq_transport::{decode, Transport};

/// Failure of a pipeline creation request.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CreateError {
    /// Human-readable message for the failure notice.
    pub fn message(&self) -> String {
        match self {
            Self::Invalid(e) => e.to_string(),
            Self::Transport(e) => e.message(),
        }
    }
}

/// Read and create access to pipeline records.
///
/// Every call round-trips: pipeline data is low-volume and must reflect the
/// server-side scan counters, so nothing is cached.
pub struct PipelineRepository<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> PipelineRepository<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// List all pipelines, in server-given order.
    pub async fn list(&self) -> Result<Vec<Pipeline>, TransportError> {
        let body = self.transport.get("/pipelines").await?;
        let pipelines: Vec<Pipeline> = decode(&body)?;
        debug!(count = pipelines.len(), "listed pipelines");
        Ok(pipelines)
    }

    /// Fetch one pipeline; an unknown id surfaces as a 404 client status
    /// (see [`TransportError::is_not_found`]).
    pub async fn get(&self, id: &str) -> Result<Pipeline, TransportError> {
        let body = self.transport.get(&format!("/pipelines/{id}")).await?;
        decode(&body)
    }

    /// Create a pipeline with the given display name.
    ///
    /// Empty and whitespace-only names are rejected locally, before any
    /// network round trip.
    pub async fn create(&self, name: &str) -> Result<Pipeline, CreateError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let body = self
            .transport
            .post_json("/pipelines", json!({ "name": name }))
            .await?;
        let pipeline: Pipeline = decode(&body)?;
        info!(id = %pipeline.id, code = %pipeline.code, "pipeline created");
        Ok(pipeline)
    }

    /// Download the pipeline's spreadsheet as produced by the server.
    pub async fn export(&self, id: &str) -> Result<Vec<u8>, TransportError> {
        self.transport.get(&format!("/pipelines/{id}/export")).await
    }
}
