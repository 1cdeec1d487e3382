use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use matriq_core::{CapturedImage, Notice, ScanError, ScanResult, UiEvent, WorkflowError};
use matriq_scan::{ResultLog, ScanEngine};
use matriq_transport::Transport;

use crate::picker::ImagePicker;

/// Where the capture workflow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    /// No image chosen.
    Idle,
    /// An image is held, not yet submitted.
    Selected(CapturedImage),
    /// A submission is in flight for the held image.
    Submitting(CapturedImage),
}

/// Drives the scan-and-accumulate workflow for one pipeline-detail view.
///
/// Each user action and each completion is a discrete event:
/// `Idle → Selected → Submitting → {Idle (appended) | Selected (failed)}`.
/// A failed submission keeps the image so the user can resubmit without
/// re-picking.
pub struct CaptureController<T: Transport> {
    pipeline_id: String,
    engine: Arc<ScanEngine<T>>,
    log: Arc<ResultLog>,
    state: CaptureState,
    events: UnboundedSender<UiEvent>,
}

impl<T: Transport> CaptureController<T> {
    pub fn new(
        pipeline_id: impl Into<String>,
        engine: Arc<ScanEngine<T>>,
        log: Arc<ResultLog>,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            engine,
            log,
            state: CaptureState::Idle,
            events,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Ask the capture capability for an image. Only acts in `Idle`; a
    /// capability failure keeps `Idle` and surfaces a transient notice.
    pub async fn choose_image(&mut self, picker: &dyn ImagePicker) {
        if self.state != CaptureState::Idle {
            debug!("choose_image ignored, an image is already held");
            return;
        }
        match picker.pick().await {
            Ok(image) => {
                debug!(file = %image.file_name, "image selected");
                self.state = CaptureState::Selected(image);
            }
            Err(e) => {
                warn!(error = %e, "image selection failed");
                self.notify(Notice::error(format!("could not select image: {e}")));
            }
        }
    }

    /// Discard the held image without submitting it.
    pub fn cancel(&mut self) {
        if let CaptureState::Selected(_) = self.state {
            self.state = CaptureState::Idle;
        }
    }

    /// Move `Selected → Submitting` and hand the image to the driver.
    ///
    /// Returns `Ok(None)` in `Idle` (with a notice to pick an image first)
    /// and rejects re-entry while a submission is pending.
    pub fn begin_submit(&mut self) -> Result<Option<CapturedImage>, WorkflowError> {
        match &self.state {
            CaptureState::Submitting(_) => Err(WorkflowError::AlreadyInProgress),
            CaptureState::Idle => {
                self.notify(Notice::error("select an image first"));
                Ok(None)
            }
            CaptureState::Selected(image) => {
                let image = image.clone();
                self.state = CaptureState::Submitting(image.clone());
                Ok(Some(image))
            }
        }
    }

    /// Apply a submission completion to the state machine.
    pub fn complete_submit(&mut self, outcome: Result<ScanResult, ScanError>) {
        let image = match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Submitting(image) => image,
            other => {
                warn!("completion received outside of a submission");
                self.state = other;
                return;
            }
        };
        match outcome {
            Ok(result) => {
                info!(pipeline_id = %self.pipeline_id, "scan appended to result log");
                self.log.append(result);
                self.notify(Notice::success("recognition complete"));
            }
            Err(e) => {
                warn!(error = %e, "scan failed, image retained");
                self.state = CaptureState::Selected(image);
                self.notify(Notice::error(format!("recognition failed: {}", e.message())));
            }
        }
    }

    /// Submit the held image and apply the outcome.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        let Some(image) = self.begin_submit()? else {
            return Ok(());
        };
        let outcome = self.engine.submit(&self.pipeline_id, &image).await;
        self.complete_submit(outcome);
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.send(UiEvent::Notice(notice));
    }
}
