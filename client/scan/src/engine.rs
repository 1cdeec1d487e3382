use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use matriq_core::{CapturedImage, ScanError, ScanResult, WorkflowError};
use matriq_transport::Transport;

/// Multipart field name the server expects the image under.
pub const IMAGE_FIELD: &str = "image";

/// Submits one image to the recognition endpoint and decodes the result.
///
/// At most one submission may be in flight per engine; a second `submit`
/// while one is pending is rejected synchronously so a double-tap can never
/// produce a duplicate result entry. Failed submissions are not retried
/// automatically: the user still holds the source image and resubmits.
pub struct ScanEngine<T: Transport> {
    transport: Arc<T>,
    in_flight: AtomicBool,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Transport> ScanEngine<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport, in_flight: AtomicBool::new(false) }
    }

    /// Whether a submission is currently pending.
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<FlightGuard<'_>, WorkflowError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("submission rejected, another is in flight");
            return Err(WorkflowError::AlreadyInProgress);
        }
        Ok(FlightGuard(&self.in_flight))
    }

    /// Upload the image to the pipeline's scan endpoint and decode the
    /// structured result.
    pub async fn submit(
        &self,
        pipeline_id: &str,
        image: &CapturedImage,
    ) -> Result<ScanResult, ScanError> {
        let _guard = self.acquire()?;
        info!(pipeline_id = %pipeline_id, file = %image.file_name, "submitting scan");
        let body = self
            .transport
            .upload(&format!("/pipelines/{pipeline_id}/scan"), IMAGE_FIELD, image)
            .await
            .map_err(ScanError::Upload)?;
        serde_json::from_slice(&body).map_err(|e| ScanError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matriq_core::TransportError;
    use matriq_transport::MockTransport;
    use serde_json::json;
    use tokio::sync::Notify;

    fn image() -> CapturedImage {
        CapturedImage {
            file_name: "label.jpg".into(),
            mime: "image/jpeg".into(),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    fn result_json() -> serde_json::Value {
        json!({
            "pipeline_id": "p1",
            "material_code": "M-100",
            "raw_ocr_text": "M-100 Qty:4,000",
            "scan_time": "2025-01-02T08:30:00Z"
        })
    }

    #[tokio::test]
    async fn test_submit_uploads_to_scan_endpoint() {
        let transport = Arc::new(MockTransport::new().with_ok_json(result_json()));
        let engine = ScanEngine::new(transport.clone());

        let result = engine.submit("p1", &image()).await.unwrap();
        assert_eq!(result.material_code.as_deref(), Some("M-100"));
        assert_eq!(transport.calls(), vec!["UPLOAD /pipelines/p1/scan"]);
        assert_eq!(transport.upload_fields(), vec![IMAGE_FIELD]);
    }

    #[tokio::test]
    async fn test_server_error_is_upload_failure() {
        let transport = Arc::new(MockTransport::new().with_error(TransportError::ServerStatus {
            code: 500,
            detail: Some("OCR service unavailable".into()),
        }));
        let engine = ScanEngine::new(transport);

        let err = engine.submit("p1", &image()).await.unwrap_err();
        match err {
            ScanError::Upload(e) => {
                assert_eq!(e.status(), Some(500));
                assert_eq!(e.message(), "OCR service unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_failure() {
        let transport = Arc::new(MockTransport::new().with_ok_body("<html>oops</html>"));
        let engine = ScanEngine::new(transport);

        let err = engine.submit("p1", &image()).await.unwrap_err();
        assert!(matches!(err, ScanError::Decode(_)));
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let hold = Arc::new(Notify::new());
        let transport =
            Arc::new(MockTransport::new().with_hold(hold.clone()).with_ok_json(result_json()));
        let engine = Arc::new(ScanEngine::new(transport.clone()));

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.submit("p1", &image()).await }
        });
        // Let the first submission reach the transport and suspend there.
        tokio::task::yield_now().await;
        assert!(engine.in_flight());

        let err = engine.submit("p1", &image()).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::Rejected(WorkflowError::AlreadyInProgress)
        ));
        // The rejected call must not have touched the transport.
        assert_eq!(transport.call_count(), 1);

        hold.notify_one();
        let result = first.await.unwrap().unwrap();
        assert_eq!(result.pipeline_id, "p1");
        assert!(!engine.in_flight());
    }

    #[tokio::test]
    async fn test_flight_flag_released_after_failure() {
        let transport = Arc::new(
            MockTransport::new()
                .with_error(TransportError::NetworkFailure("timeout".into()))
                .with_ok_json(result_json()),
        );
        let engine = ScanEngine::new(transport);

        assert!(engine.submit("p1", &image()).await.is_err());
        assert!(!engine.in_flight());
        assert!(engine.submit("p1", &image()).await.is_ok());
    }
}
