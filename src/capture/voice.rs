//! Voice note recording
//!
//! Wraps the audio recorder provider in the Idle -> Recording -> Processing
//! cycle. Stopping yields a [`VoiceNote`]; cancelling throws the audio away
//! without touching the draft.
//!
//! Cancelling also bumps a generation counter. A start or stop that was
//! already waiting on the provider when that happened resolves as a no-op:
//! a late handle is discarded and a late note is dropped.

use crate::providers::{AudioRecorderProvider, Capability, RecordingHandle};
use crate::utils::InFlight;
use crate::{EcoReportError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Recording state for voice input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Microphone is capturing
    Recording,
    /// Recording stopped, audio being finalized
    Processing,
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, RecordingState::Processing)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingState::Idle)
    }
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Recording => write!(f, "Recording"),
            RecordingState::Processing => write!(f, "Processing"),
        }
    }
}

/// Languages offered for voice reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceLanguage {
    #[default]
    English,
    Afrikaans,
    Zulu,
    Xhosa,
    Sotho,
}

impl VoiceLanguage {
    pub const ALL: [VoiceLanguage; 5] = [
        VoiceLanguage::English,
        VoiceLanguage::Afrikaans,
        VoiceLanguage::Zulu,
        VoiceLanguage::Xhosa,
        VoiceLanguage::Sotho,
    ];

    /// BCP-47 tag
    pub fn code(&self) -> &'static str {
        match self {
            VoiceLanguage::English => "en-US",
            VoiceLanguage::Afrikaans => "af-ZA",
            VoiceLanguage::Zulu => "zu-ZA",
            VoiceLanguage::Xhosa => "xh-ZA",
            VoiceLanguage::Sotho => "st-ZA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoiceLanguage::English => "English",
            VoiceLanguage::Afrikaans => "Afrikaans",
            VoiceLanguage::Zulu => "Zulu",
            VoiceLanguage::Xhosa => "Xhosa",
            VoiceLanguage::Sotho => "Sotho",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

/// A finished voice recording
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    pub uri: String,
    pub language: VoiceLanguage,
    pub duration_secs: u64,
    pub recorded_at: DateTime<Utc>,
    /// Always empty for now; there is no speech-to-text
    pub transcript: Option<String>,
}

impl VoiceNote {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language: VoiceLanguage::default(),
            duration_secs: 0,
            recorded_at: Utc::now(),
            transcript: None,
        }
    }
}

struct ActiveRecording {
    handle: RecordingHandle,
    started_at: DateTime<Utc>,
    language: VoiceLanguage,
}

#[derive(Default)]
struct RecorderInner {
    state: RecordingState,
    language: VoiceLanguage,
    active: Option<ActiveRecording>,
}

pub struct VoiceRecorder {
    provider: Arc<dyn AudioRecorderProvider>,
    inner: Mutex<RecorderInner>,
    in_flight: InFlight,
    generation: AtomicU64,
}

impl VoiceRecorder {
    pub fn new(provider: Arc<dyn AudioRecorderProvider>) -> Self {
        Self {
            provider,
            inner: Mutex::new(RecorderInner::default()),
            in_flight: InFlight::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_language(self, language: VoiceLanguage) -> Self {
        self.inner.lock().language = language;
        self
    }

    pub fn state(&self) -> RecordingState {
        self.inner.lock().state
    }

    pub fn language(&self) -> VoiceLanguage {
        self.inner.lock().language
    }

    /// Change the language; refused while a recording is active
    pub fn set_language(&self, language: VoiceLanguage) -> bool {
        let mut inner = self.inner.lock();
        if !inner.state.is_idle() {
            return false;
        }
        inner.language = language;
        true
    }

    /// Seconds since the current recording started
    pub fn elapsed_secs(&self) -> Option<u64> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|active| seconds_since(active.started_at))
    }

    /// Current generation; changes whenever the recorder is invalidated
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Make any pending start or stop resolve as a no-op
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Start recording. Returns false if the recorder was not idle.
    pub async fn start(&self) -> Result<bool> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(false);
        };
        if !self.state().is_idle() {
            return Ok(false);
        }
        let generation = self.generation();

        if !self.provider.request_permission().await.is_granted() {
            return Err(EcoReportError::PermissionDenied(Capability::Microphone));
        }

        let handle = self.provider.start().await?;

        let started = {
            let mut inner = self.inner.lock();
            if self.generation() == generation {
                let language = inner.language;
                inner.active = Some(ActiveRecording {
                    handle,
                    started_at: Utc::now(),
                    language,
                });
                inner.state = RecordingState::Recording;
                Some(language)
            } else {
                None
            }
        };

        match started {
            Some(language) => {
                info!("Recording started ({})", language.name());
                Ok(true)
            }
            None => {
                debug!("Recording cancelled while starting, discarding handle");
                self.provider.discard(handle).await;
                Ok(false)
            }
        }
    }

    /// Stop recording and hand back the finished note
    ///
    /// Returns `Ok(None)` if nothing was recording or the recorder was
    /// cancelled while stopping. On a provider error the recorder goes back to
    /// idle and the audio is lost.
    pub async fn stop(&self) -> Result<Option<VoiceNote>> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(None);
        };
        let generation = self.generation();
        let active = {
            let mut inner = self.inner.lock();
            if !inner.state.is_recording() {
                return Ok(None);
            }
            inner.state = RecordingState::Processing;
            inner.active.take()
        };
        let Some(active) = active else {
            self.inner.lock().state = RecordingState::Idle;
            return Ok(None);
        };

        let result = self.provider.stop(active.handle).await;
        self.inner.lock().state = RecordingState::Idle;

        let uri = result?;
        if self.generation() != generation {
            debug!("Recording cancelled while stopping, dropping {}", uri);
            return Ok(None);
        }
        let note = VoiceNote {
            uri,
            language: active.language,
            duration_secs: seconds_since(active.started_at),
            recorded_at: active.started_at,
            transcript: None,
        };
        info!("Recording stopped: {} ({}s)", note.uri, note.duration_secs);
        Ok(Some(note))
    }

    /// Abandon the current recording and any start or stop still pending
    ///
    /// Returns false if nothing was recording.
    pub async fn cancel(&self) -> bool {
        let active = {
            let mut inner = self.inner.lock();
            self.invalidate();
            if !inner.state.is_recording() {
                return false;
            }
            inner.state = RecordingState::Idle;
            inner.active.take()
        };
        if let Some(active) = active {
            self.provider.discard(active.handle).await;
        }
        debug!("Recording cancelled");
        true
    }
}

fn seconds_since(start: DateTime<Utc>) -> u64 {
    (Utc::now() - start).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SimulatedRecorder;
    use std::time::Duration;

    #[test]
    fn test_language_codes() {
        assert_eq!(VoiceLanguage::default().code(), "en-US");
        assert_eq!(VoiceLanguage::from_code("zu-ZA"), Some(VoiceLanguage::Zulu));
        assert_eq!(VoiceLanguage::from_code("fr-FR"), None);
        assert_eq!(VoiceLanguage::Sotho.name(), "Sotho");
    }

    #[tokio::test]
    async fn test_record_cycle() {
        let recorder = VoiceRecorder::new(Arc::new(SimulatedRecorder::new()));
        assert!(recorder.state().is_idle());

        assert!(recorder.start().await.unwrap());
        assert!(recorder.state().is_recording());
        assert!(recorder.elapsed_secs().is_some());

        let note = recorder.stop().await.unwrap().expect("note");
        assert!(note.uri.starts_with("audio://"));
        assert_eq!(note.language, VoiceLanguage::English);
        assert!(note.transcript.is_none());
        assert!(recorder.state().is_idle());
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let recorder = VoiceRecorder::new(Arc::new(SimulatedRecorder::new()));
        assert!(recorder.start().await.unwrap());
        assert!(!recorder.start().await.unwrap());
    }

    #[tokio::test]
    async fn test_stop_without_recording() {
        let recorder = VoiceRecorder::new(Arc::new(SimulatedRecorder::new()));
        assert!(recorder.stop().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_discards_audio() {
        let provider = Arc::new(SimulatedRecorder::new());
        let recorder = VoiceRecorder::new(provider.clone());
        recorder.start().await.unwrap();

        assert!(recorder.cancel().await);
        assert!(recorder.state().is_idle());
        assert!(!provider.is_active());
        assert_eq!(provider.discarded_count(), 1);
        assert!(recorder.stop().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_during_start_discards_handle() {
        let provider = Arc::new(SimulatedRecorder::new().with_delay(Duration::from_millis(40)));
        let recorder = VoiceRecorder::new(provider.clone());

        let (started, _) = tokio::join!(recorder.start(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            recorder.cancel().await
        });

        assert!(!started.unwrap());
        assert!(recorder.state().is_idle());
        assert!(!provider.is_active());
        assert_eq!(provider.discarded_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_stop_drops_note() {
        let provider = Arc::new(SimulatedRecorder::new().with_delay(Duration::from_millis(40)));
        let recorder = VoiceRecorder::new(provider);
        recorder.start().await.unwrap();

        let (note, _) = tokio::join!(recorder.stop(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            recorder.cancel().await
        });

        assert!(note.unwrap().is_none());
        assert!(recorder.state().is_idle());
    }

    #[tokio::test]
    async fn test_language_locked_while_recording() {
        let recorder = VoiceRecorder::new(Arc::new(SimulatedRecorder::new()));
        assert!(recorder.set_language(VoiceLanguage::Xhosa));
        recorder.start().await.unwrap();
        assert!(!recorder.set_language(VoiceLanguage::Zulu));

        let note = recorder.stop().await.unwrap().unwrap();
        assert_eq!(note.language, VoiceLanguage::Xhosa);
    }

    #[tokio::test]
    async fn test_microphone_denied() {
        let provider = Arc::new(SimulatedRecorder::new());
        provider.set_permission(false);
        let recorder = VoiceRecorder::new(provider);

        let err = recorder.start().await.unwrap_err();
        assert_eq!(err, EcoReportError::PermissionDenied(Capability::Microphone));
        assert!(recorder.state().is_idle());
    }

    #[tokio::test]
    async fn test_start_failure_stays_idle() {
        let provider = Arc::new(SimulatedRecorder::new());
        provider.set_failing(true);
        let recorder = VoiceRecorder::new(provider);

        assert!(recorder.start().await.is_err());
        assert!(recorder.state().is_idle());
    }
}
