use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use matriq_api::PipelineRepository;
use matriq_config::Config;
use matriq_core::{Notice, Pipeline, ScanResult, UiEvent};
use matriq_scan::{ResultLog, ScanEngine};
use matriq_transport::Transport;

use crate::capture::CaptureController;

/// One pipeline-detail viewing session.
///
/// Owns the result log and capture controller for its lifetime; the log
/// lives exactly as long as the view and is cleared on teardown. A failed
/// initial load cannot be rendered meaningfully, so it notices and asks the
/// presentation layer to navigate back after a fixed delay.
pub struct DetailSession<T: Transport> {
    pipeline_id: String,
    repo: PipelineRepository<T>,
    pipeline: Option<Pipeline>,
    loading: bool,
    nav_back_delay: Duration,
    log: Arc<ResultLog>,
    capture: CaptureController<T>,
    events: UnboundedSender<UiEvent>,
}

impl<T: Transport> DetailSession<T> {
    pub fn new(
        pipeline_id: impl Into<String>,
        transport: Arc<T>,
        config: &Config,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        let pipeline_id = pipeline_id.into();
        let log = Arc::new(ResultLog::new());
        let engine = Arc::new(ScanEngine::new(transport.clone()));
        let capture =
            CaptureController::new(pipeline_id.clone(), engine, log.clone(), events.clone());
        Self {
            pipeline_id,
            repo: PipelineRepository::new(transport),
            pipeline: None,
            loading: false,
            nav_back_delay: Duration::from_millis(config.nav_back_delay_ms),
            log,
            capture,
            events,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pipeline(&self) -> Option<&Pipeline> {
        self.pipeline.as_ref()
    }

    pub fn capture(&mut self) -> &mut CaptureController<T> {
        &mut self.capture
    }

    /// Results accumulated this session, most recent first.
    pub fn results(&self) -> Vec<ScanResult> {
        self.log.snapshot()
    }

    /// Fetch the pipeline record. Returns whether the view can render.
    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let outcome = self.repo.get(&self.pipeline_id).await;
        self.loading = false;
        match outcome {
            Ok(pipeline) => {
                info!(id = %pipeline.id, code = %pipeline.code, "pipeline detail loaded");
                self.pipeline = Some(pipeline);
                true
            }
            Err(e) => {
                warn!(id = %self.pipeline_id, error = %e, "pipeline detail load failed");
                let _ = self.events.send(UiEvent::Notice(Notice::error(format!(
                    "load failed: {}",
                    e.message()
                ))));
                tokio::time::sleep(self.nav_back_delay).await;
                let _ = self.events.send(UiEvent::NavigateBack);
                false
            }
        }
    }

    /// End the viewing session, dropping the accumulated results.
    pub fn teardown(&mut self) {
        self.log.clear();
        self.pipeline = None;
    }
}
