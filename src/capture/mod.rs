//! Photo and voice capture for a report draft

pub mod camera;
pub mod session;
pub mod voice;

pub use camera::PhotoCapture;
pub use session::{CaptureSession, CaptureState};
pub use voice::{RecordingState, VoiceLanguage, VoiceNote, VoiceRecorder};
