use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use matriq_api::PipelineRepository;
use matriq_core::{Notice, Pipeline, UiEvent, WorkflowError};
use matriq_transport::Transport;

/// The pipeline-creation form: `Idle(form) → Submitting(create) →
/// {navigate-to-detail | Idle(form) + error}`.
///
/// An empty name is rejected by the repository before any network call; the
/// flow only turns the rejection into a notice.
pub struct CreateFlow<T: Transport> {
    repo: PipelineRepository<T>,
    events: UnboundedSender<UiEvent>,
    submitting: bool,
}

impl<T: Transport> CreateFlow<T> {
    pub fn new(repo: PipelineRepository<T>, events: UnboundedSender<UiEvent>) -> Self {
        Self { repo, events, submitting: false }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit the form. On success emits a success notice plus a
    /// navigate-to-detail effect for the new id; on failure emits an error
    /// notice and leaves the form as it was.
    pub async fn submit(&mut self, name: &str) -> Result<Option<Pipeline>, WorkflowError> {
        if self.submitting {
            return Err(WorkflowError::AlreadyInProgress);
        }
        self.submitting = true;
        let outcome = self.repo.create(name).await;
        self.submitting = false;

        match outcome {
            Ok(pipeline) => {
                info!(id = %pipeline.id, "pipeline created, navigating to detail");
                let _ = self.events.send(UiEvent::Notice(Notice::success("pipeline created")));
                let _ = self.events.send(UiEvent::NavigateToDetail {
                    pipeline_id: pipeline.id.clone(),
                });
                Ok(Some(pipeline))
            }
            Err(e) => {
                let _ = self.events.send(UiEvent::Notice(Notice::error(format!(
                    "creation failed: {}",
                    e.message()
                ))));
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use matriq_core::{NoticeKind, TransportError};
    use matriq_transport::MockTransport;
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn flow(
        transport: Arc<MockTransport>,
    ) -> (CreateFlow<MockTransport>, UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CreateFlow::new(PipelineRepository::new(transport), tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_empty_name_rejected_locally_with_notice() {
        let transport = Arc::new(MockTransport::new());
        let (mut flow, mut rx) = flow(transport.clone());

        let created = flow.submit("   ").await.unwrap();
        assert!(created.is_none());
        assert_eq!(transport.call_count(), 0);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            UiEvent::Notice(n) => {
                assert_eq!(n.kind, NoticeKind::Error);
                assert!(n.message.contains("must not be empty"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_emits_notice_then_navigation() {
        let transport = Arc::new(MockTransport::new().with_ok_json(json!({
            "id": "p1",
            "code": "PL-001",
            "name": "SMT-A线",
            "created_at": "2025-01-01T00:00:00Z",
            "total_scans": 0
        })));
        let (mut flow, mut rx) = flow(transport);

        let pipeline = flow.submit("SMT-A线").await.unwrap().unwrap();
        assert_eq!(pipeline.id, "p1");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], UiEvent::Notice(n) if n.kind == NoticeKind::Success));
        assert_eq!(
            events[1],
            UiEvent::NavigateToDetail { pipeline_id: "p1".into() }
        );
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_form_and_notices() {
        let transport = Arc::new(MockTransport::new().with_error(TransportError::ClientStatus {
            code: 400,
            detail: Some("name already in use".into()),
        }));
        let (mut flow, mut rx) = flow(transport);

        let created = flow.submit("SMT-A线").await.unwrap();
        assert!(created.is_none());
        assert!(!flow.is_submitting());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], UiEvent::Notice(n) if n.message.contains("name already in use")));
    }
}
