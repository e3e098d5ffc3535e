//! Flow events and state snapshots
//!
//! Events notify the presentation layer that something happened (including
//! errors that must be shown to the user). Current state should be read from
//! a [`FlowSnapshot`] rather than reconstructed from events.

use crate::capture::{CaptureState, RecordingState, VoiceLanguage};
use crate::location::Coordinates;
use crate::points::Redemption;
use crate::report::{Category, ReportRecord, ReportSummary, RequiredField, Urgency};
use crate::EcoReportError;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum FlowEvent {
    PhotoCaptured { uri: String },
    PhotoRemoved,
    /// Camera was closed without taking a photo
    CaptureCancelled,

    RecordingStarted { language: VoiceLanguage },
    VoiceNoteRecorded { uri: String, duration_secs: u64 },
    RecordingCancelled,
    VoiceNoteRemoved,

    LocationUpdated {
        coordinates: Option<Coordinates>,
        address: String,
    },
    LocationCleared,

    SubmissionStarted { report_id: Uuid },
    ReportSubmitted {
        report: ReportRecord,
        feed_id: u64,
        balance: u64,
    },

    RewardRedeemed(Redemption),

    /// An operation failed; `message` is meant for an alert dialog
    Error {
        message: String,
        recoverable: bool,
    },
}

impl FlowEvent {
    pub fn from_error(error: &EcoReportError) -> Self {
        FlowEvent::Error {
            message: error.user_message(),
            recoverable: error.is_recoverable(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FlowEvent::Error { .. })
    }
}

/// Immutable view of the flow at one point in time
#[derive(Clone, Debug)]
pub struct FlowSnapshot {
    pub capture: CaptureState,
    pub photo_uri: Option<String>,
    pub voice_uri: Option<String>,
    pub location_visible: bool,
    pub coordinates: Option<Coordinates>,
    pub address: String,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub can_submit: bool,
    pub missing: Vec<RequiredField>,
    pub recording: RecordingState,
    pub voice_language: VoiceLanguage,
    pub locating: bool,
    pub submitting: bool,
    pub balance: u64,
    pub recent_reports: Vec<ReportSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Capability;

    #[test]
    fn test_error_event_uses_user_message() {
        let event = FlowEvent::from_error(&EcoReportError::PermissionDenied(Capability::Camera));
        match event {
            FlowEvent::Error {
                message,
                recoverable,
            } => {
                assert_eq!(message, "Camera permission is required to continue.");
                assert!(recoverable);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
