use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use matriq_api::PipelineRepository;
use matriq_core::{Notice, Pipeline, UiEvent};
use matriq_transport::Transport;

/// The pipeline-list screen: a single loading flag around the fetch.
///
/// An empty collection is the "no pipelines" state, not an error; a fetch
/// failure surfaces a notice and leaves whatever was shown before.
pub struct ListController<T: Transport> {
    repo: PipelineRepository<T>,
    events: UnboundedSender<UiEvent>,
    loading: bool,
    pipelines: Vec<Pipeline>,
}

impl<T: Transport> ListController<T> {
    pub fn new(repo: PipelineRepository<T>, events: UnboundedSender<UiEvent>) -> Self {
        Self { repo, events, loading: false, pipelines: Vec::new() }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// Fetch the full collection from the server.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.repo.list().await {
            Ok(pipelines) => {
                debug!(count = pipelines.len(), "pipeline list loaded");
                self.pipelines = pipelines;
            }
            Err(e) => {
                let _ = self.events.send(UiEvent::Notice(Notice::error(format!(
                    "load failed: {}",
                    e.message()
                ))));
            }
        }
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use matriq_core::TransportError;
    use matriq_transport::MockTransport;
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn controller(
        transport: Arc<MockTransport>,
    ) -> (ListController<MockTransport>, UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ListController::new(PipelineRepository::new(transport), tx), rx)
    }

    #[tokio::test]
    async fn test_empty_list_is_no_pipelines_not_an_error() {
        let transport = Arc::new(MockTransport::new().with_ok_json(json!([])));
        let (mut ctrl, mut rx) = controller(transport);

        ctrl.load().await;
        assert!(ctrl.pipelines().is_empty());
        assert!(!ctrl.is_loading());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_load_failure_notices_and_keeps_previous_list() {
        let transport = Arc::new(
            MockTransport::new()
                .with_ok_json(json!([{
                    "id": "p1",
                    "code": "PL-001",
                    "name": "SMT-A线",
                    "created_at": "2025-01-01T00:00:00Z",
                    "total_scans": 2
                }]))
                .with_error(TransportError::NetworkFailure("offline".into())),
        );
        let (mut ctrl, mut rx) = controller(transport);

        ctrl.load().await;
        assert_eq!(ctrl.pipelines().len(), 1);

        ctrl.load().await;
        assert_eq!(ctrl.pipelines().len(), 1);
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, UiEvent::Notice(n) if n.message.contains("network request failed")));
    }
}
