//! Device capability providers
//!
//! The workflow never talks to the camera, microphone, geolocation service or
//! report backend directly. Each capability is an async trait object injected
//! into the flow, so the platform binding can be swapped for the simulated
//! implementations in [`simulated`] or for fakes in tests.

pub mod simulated;

use crate::location::Coordinates;
use crate::report::ReportRecord;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use simulated::{SimulatedCamera, SimulatedGeolocation, SimulatedRecorder, SimulatedUploader};

/// Device capability that needs a user permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Camera,
    Microphone,
    Location,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Camera => write!(f, "Camera"),
            Capability::Microphone => write!(f, "Microphone"),
            Capability::Location => write!(f, "Location"),
        }
    }
}

/// Result of a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Permission::Granted)
    }
}

/// Outcome of opening the camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A photo was taken and stored at this uri
    Captured(String),
    /// The user closed the camera without taking a photo
    Cancelled,
}

/// Opaque handle for an in-progress audio recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingHandle(pub u64);

/// One reverse-geocoding result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComponents {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl AddressComponents {
    /// Join the present, non-empty parts as "street, city, region, country"
    pub fn formatted(&self) -> String {
        [&self.street, &self.city, &self.region, &self.country]
            .into_iter()
            .flatten()
            .map(|part| part.as_str())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
pub trait CameraProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn capture_photo(&self) -> Result<CaptureOutcome>;
}

#[async_trait]
pub trait AudioRecorderProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn start(&self) -> Result<RecordingHandle>;

    /// Stop the recording and return the uri of the saved audio
    async fn stop(&self, handle: RecordingHandle) -> Result<String>;

    /// Stop the recording and throw the audio away
    async fn discard(&self, handle: RecordingHandle);
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<Coordinates>;

    /// May return no results, in which case the address is left alone
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<AddressComponents>>;
}

/// Delivers a finalized report to wherever reports go
#[async_trait]
pub trait ReportUploader: Send + Sync {
    async fn upload(&self, report: &ReportRecord) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_address_skips_missing_parts() {
        let components = AddressComponents {
            street: Some("12 Main St".to_string()),
            city: None,
            region: Some(String::new()),
            country: Some("South Africa".to_string()),
        };
        assert_eq!(components.formatted(), "12 Main St, South Africa");
    }

    #[test]
    fn test_formatted_address_empty() {
        assert_eq!(AddressComponents::default().formatted(), "");
    }
}
