//! Simulated providers
//!
//! Stand-ins for the platform bindings. They answer after a configurable
//! delay and can be told to deny permission, fail, or (for the camera) behave
//! as if the user closed the capture screen.

use super::{
    AddressComponents, AudioRecorderProvider, CameraProvider, CaptureOutcome, Capability,
    GeolocationProvider, Permission, RecordingHandle, ReportUploader,
};
use crate::location::Coordinates;
use crate::report::ReportRecord;
use crate::{EcoReportError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

async fn simulate_delay(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

fn permission_from(granted: bool) -> Permission {
    if granted {
        Permission::Granted
    } else {
        Permission::Denied
    }
}

pub struct SimulatedCamera {
    granted: AtomicBool,
    fail: AtomicBool,
    cancel_next: AtomicBool,
    delay: Duration,
    captured: AtomicU64,
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self {
            granted: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            cancel_next: AtomicBool::new(false),
            delay: Duration::ZERO,
            captured: AtomicU64::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_permission(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The next capture behaves as if the user closed the camera
    pub fn cancel_next(&self) {
        self.cancel_next.store(true, Ordering::SeqCst);
    }

    /// Number of photos actually taken
    pub fn captured_count(&self) -> u64 {
        self.captured.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraProvider for SimulatedCamera {
    async fn request_permission(&self) -> Permission {
        permission_from(self.granted.load(Ordering::SeqCst))
    }

    async fn capture_photo(&self) -> Result<CaptureOutcome> {
        simulate_delay(self.delay).await;
        if self.cancel_next.swap(false, Ordering::SeqCst) {
            return Ok(CaptureOutcome::Cancelled);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(EcoReportError::device(Capability::Camera, "camera unavailable"));
        }
        let n = self.captured.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CaptureOutcome::Captured(format!("img://{}", n)))
    }
}

pub struct SimulatedRecorder {
    granted: AtomicBool,
    fail: AtomicBool,
    delay: Duration,
    next_handle: AtomicU64,
    active: Mutex<Option<RecordingHandle>>,
    discarded: AtomicU64,
}

impl Default for SimulatedRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRecorder {
    pub fn new() -> Self {
        Self {
            granted: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            delay: Duration::ZERO,
            next_handle: AtomicU64::new(1),
            active: Mutex::new(None),
            discarded: AtomicU64::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_permission(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioRecorderProvider for SimulatedRecorder {
    async fn request_permission(&self) -> Permission {
        permission_from(self.granted.load(Ordering::SeqCst))
    }

    async fn start(&self) -> Result<RecordingHandle> {
        simulate_delay(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(EcoReportError::device(
                Capability::Microphone,
                "failed to start recording",
            ));
        }
        let handle = RecordingHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        *self.active.lock() = Some(handle);
        Ok(handle)
    }

    async fn stop(&self, handle: RecordingHandle) -> Result<String> {
        simulate_delay(self.delay).await;
        let mut active = self.active.lock();
        if *active != Some(handle) {
            return Err(EcoReportError::device(
                Capability::Microphone,
                format!("no active recording for handle {}", handle.0),
            ));
        }
        *active = None;
        Ok(format!("audio://{}", handle.0))
    }

    async fn discard(&self, handle: RecordingHandle) {
        let mut active = self.active.lock();
        if *active == Some(handle) {
            *active = None;
            self.discarded.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct SimulatedGeolocation {
    granted: AtomicBool,
    fail: AtomicBool,
    fail_geocode: AtomicBool,
    delay: Duration,
    fix: Mutex<Coordinates>,
    addresses: Mutex<Vec<AddressComponents>>,
    lookups: AtomicU64,
}

impl Default for SimulatedGeolocation {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGeolocation {
    pub fn new() -> Self {
        Self {
            granted: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fail_geocode: AtomicBool::new(false),
            delay: Duration::ZERO,
            fix: Mutex::new(Coordinates::new(-33.924_870, 18.424_055).with_accuracy(12.0)),
            addresses: Mutex::new(vec![AddressComponents {
                street: Some("12 Long Street".to_string()),
                city: Some("Cape Town".to_string()),
                region: Some("Western Cape".to_string()),
                country: Some("South Africa".to_string()),
            }]),
            lookups: AtomicU64::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_permission(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make reverse geocoding fail while positions still resolve
    pub fn set_geocode_failing(&self, fail: bool) {
        self.fail_geocode.store(fail, Ordering::SeqCst);
    }

    pub fn set_fix(&self, coordinates: Coordinates) {
        *self.fix.lock() = coordinates;
    }

    /// Results returned by reverse geocoding; empty means "no match"
    pub fn set_addresses(&self, addresses: Vec<AddressComponents>) {
        *self.addresses.lock() = addresses;
    }

    /// Number of position lookups served
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeolocationProvider for SimulatedGeolocation {
    async fn request_permission(&self) -> Permission {
        permission_from(self.granted.load(Ordering::SeqCst))
    }

    async fn current_position(&self) -> Result<Coordinates> {
        simulate_delay(self.delay).await;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EcoReportError::device(
                Capability::Location,
                "position unavailable",
            ));
        }
        Ok(*self.fix.lock())
    }

    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<Vec<AddressComponents>> {
        if self.fail_geocode.load(Ordering::SeqCst) {
            return Err(EcoReportError::device(
                Capability::Location,
                "reverse geocoding unavailable",
            ));
        }
        Ok(self.addresses.lock().clone())
    }
}

/// Uploader that only waits, the way the app fakes its network call
pub struct SimulatedUploader {
    delay: Duration,
    fail: AtomicBool,
    uploaded: AtomicU64,
}

impl SimulatedUploader {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail: AtomicBool::new(false),
            uploaded: AtomicU64::new(0),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn uploaded_count(&self) -> u64 {
        self.uploaded.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedUploader {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl ReportUploader for SimulatedUploader {
    async fn upload(&self, report: &ReportRecord) -> Result<()> {
        debug!("Simulating upload of report {} ({:?})", report.id, self.delay);
        simulate_delay(self.delay).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(EcoReportError::UploadError("network unreachable".to_string()));
        }
        self.uploaded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_camera_numbers_photos() {
        let camera = SimulatedCamera::new();
        assert_eq!(
            camera.capture_photo().await.unwrap(),
            CaptureOutcome::Captured("img://1".to_string())
        );
        assert_eq!(
            camera.capture_photo().await.unwrap(),
            CaptureOutcome::Captured("img://2".to_string())
        );
        assert_eq!(camera.captured_count(), 2);
    }

    #[tokio::test]
    async fn test_camera_cancel_is_one_shot() {
        let camera = SimulatedCamera::new();
        camera.cancel_next();
        assert_eq!(camera.capture_photo().await.unwrap(), CaptureOutcome::Cancelled);
        assert!(matches!(
            camera.capture_photo().await.unwrap(),
            CaptureOutcome::Captured(_)
        ));
    }

    #[tokio::test]
    async fn test_recorder_stop_requires_active_handle() {
        let recorder = SimulatedRecorder::new();
        let handle = recorder.start().await.unwrap();
        assert!(recorder.is_active());
        let uri = recorder.stop(handle).await.unwrap();
        assert_eq!(uri, format!("audio://{}", handle.0));
        assert!(recorder.stop(handle).await.is_err());
    }

    #[tokio::test]
    async fn test_geolocation_failure() {
        let geo = SimulatedGeolocation::new();
        geo.set_failing(true);
        let err = geo.current_position().await.unwrap_err();
        assert!(matches!(
            err,
            EcoReportError::DeviceOperation {
                capability: Capability::Location,
                ..
            }
        ));
    }
}
