use crate::providers::{CameraProvider, CaptureOutcome, Capability};
use crate::utils::InFlight;
use crate::{EcoReportError, Result};
use std::sync::Arc;
use tracing::debug;

/// Drives the camera provider for one draft
pub struct PhotoCapture {
    provider: Arc<dyn CameraProvider>,
    in_flight: InFlight,
}

impl PhotoCapture {
    pub fn new(provider: Arc<dyn CameraProvider>) -> Self {
        Self {
            provider,
            in_flight: InFlight::new(),
        }
    }

    /// Open the camera and wait for the user
    ///
    /// Returns `Ok(None)` when a capture is already running.
    pub async fn take_photo(&self) -> Result<Option<CaptureOutcome>> {
        let Some(_guard) = self.in_flight.try_begin() else {
            debug!("Camera already open, ignoring request");
            return Ok(None);
        };

        if !self.provider.request_permission().await.is_granted() {
            return Err(EcoReportError::PermissionDenied(Capability::Camera));
        }

        let outcome = self.provider.capture_photo().await?;
        if outcome == CaptureOutcome::Cancelled {
            debug!("Camera closed without a photo");
        }
        Ok(Some(outcome))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SimulatedCamera;
    use std::time::Duration;

    #[tokio::test]
    async fn test_take_photo() {
        let capture = PhotoCapture::new(Arc::new(SimulatedCamera::new()));
        assert_eq!(
            capture.take_photo().await.unwrap(),
            Some(CaptureOutcome::Captured("img://1".to_string()))
        );
        assert!(!capture.is_busy());
    }

    #[tokio::test]
    async fn test_denied_camera() {
        let camera = Arc::new(SimulatedCamera::new());
        camera.set_permission(false);
        let capture = PhotoCapture::new(camera.clone());

        let err = capture.take_photo().await.unwrap_err();
        assert_eq!(err, EcoReportError::PermissionDenied(Capability::Camera));
        assert_eq!(camera.captured_count(), 0);
    }

    #[tokio::test]
    async fn test_second_capture_while_open_is_ignored() {
        let camera = Arc::new(SimulatedCamera::new().with_delay(Duration::from_millis(30)));
        let capture = PhotoCapture::new(camera.clone());

        let (first, second) = tokio::join!(capture.take_photo(), capture.take_photo());
        assert!(first.unwrap().is_some());
        assert!(second.unwrap().is_none());
        assert_eq!(camera.captured_count(), 1);
    }
}
