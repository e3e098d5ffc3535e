use super::voice::VoiceNote;
use serde::{Deserialize, Serialize};

/// Which artifacts are attached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureState {
    #[default]
    Empty,
    HasPhoto,
    HasVoice,
    HasBoth,
}

impl CaptureState {
    pub fn has_any(&self) -> bool {
        !matches!(self, CaptureState::Empty)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Empty => write!(f, "Empty"),
            CaptureState::HasPhoto => write!(f, "HasPhoto"),
            CaptureState::HasVoice => write!(f, "HasVoice"),
            CaptureState::HasBoth => write!(f, "HasBoth"),
        }
    }
}

/// Media attached to the in-progress report
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSession {
    photo_uri: Option<String>,
    voice_note: Option<VoiceNote>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a photo, replacing any earlier one (retake)
    pub fn capture_photo(&mut self, uri: impl Into<String>) {
        self.photo_uri = Some(uri.into());
    }

    pub fn remove_photo(&mut self) {
        self.photo_uri = None;
    }

    /// Attach a bare voice recording
    pub fn record_voice_note(&mut self, uri: impl Into<String>) {
        self.voice_note = Some(VoiceNote::from_uri(uri));
    }

    pub fn attach_voice_note(&mut self, note: VoiceNote) {
        self.voice_note = Some(note);
    }

    pub fn remove_voice_note(&mut self) {
        self.voice_note = None;
    }

    pub fn clear(&mut self) {
        self.photo_uri = None;
        self.voice_note = None;
    }

    pub fn has_photo(&self) -> bool {
        self.photo_uri.is_some()
    }

    pub fn has_voice_note(&self) -> bool {
        self.voice_note.is_some()
    }

    pub fn photo_uri(&self) -> Option<&str> {
        self.photo_uri.as_deref()
    }

    pub fn voice_uri(&self) -> Option<&str> {
        self.voice_note.as_ref().map(|note| note.uri.as_str())
    }

    pub fn voice_note(&self) -> Option<&VoiceNote> {
        self.voice_note.as_ref()
    }

    pub fn state(&self) -> CaptureState {
        match (self.has_photo(), self.has_voice_note()) {
            (false, false) => CaptureState::Empty,
            (true, false) => CaptureState::HasPhoto,
            (false, true) => CaptureState::HasVoice,
            (true, true) => CaptureState::HasBoth,
        }
    }

    /// The location step is shown once any artifact exists
    pub fn location_step_visible(&self) -> bool {
        self.state().has_any()
    }
}
