//! Report capture and submission flow
//!
//! Ties the draft to the device providers, the points ledger and the recent
//! reports feed: capture -> location -> submit -> credit -> feed.
//!
//! Every operation takes `&self`. Draft state sits behind a short-lived lock
//! that is never held across an `.await`; each device call is guarded so a
//! repeated trigger while it is pending does nothing.

use super::config::EcoReportConfig;
use super::events::{FlowEvent, FlowSnapshot};
use crate::capture::{PhotoCapture, VoiceLanguage, VoiceNote, VoiceRecorder};
use crate::feed::RecentReportsFeed;
use crate::location::{LocationLookup, LookupOutcome};
use crate::points::{LedgerReason, PointsLedger, Redemption, RewardCatalog};
use crate::providers::{
    AudioRecorderProvider, CameraProvider, CaptureOutcome, GeolocationProvider, ReportUploader,
    SimulatedCamera, SimulatedGeolocation, SimulatedRecorder, SimulatedUploader,
};
use crate::report::{Category, ReportDraft, ReportRecord, RequiredField, Urgency};
use crate::utils::{EventChannel, InFlight};
use crate::Result;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ReportFlow {
    config: EcoReportConfig,
    draft: Mutex<ReportDraft>,
    camera: PhotoCapture,
    recorder: VoiceRecorder,
    location: LocationLookup,
    uploader: Arc<dyn ReportUploader>,
    ledger: PointsLedger,
    feed: RecentReportsFeed,
    rewards: RewardCatalog,
    submitting: InFlight,
    events: EventChannel<FlowEvent>,
}

impl ReportFlow {
    pub fn builder() -> ReportFlowBuilder {
        ReportFlowBuilder::new()
    }

    pub fn config(&self) -> &EcoReportConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PointsLedger {
        &self.ledger
    }

    pub fn feed(&self) -> &RecentReportsFeed {
        &self.feed
    }

    pub fn rewards(&self) -> &RewardCatalog {
        &self.rewards
    }

    /// Receiver for flow events
    pub fn events(&self) -> Receiver<FlowEvent> {
        self.events.receiver()
    }

    /// Take every event published since the last drain
    pub fn drain_events(&self) -> Vec<FlowEvent> {
        self.events.drain()
    }

    /// Copy of the current draft
    pub fn draft(&self) -> ReportDraft {
        self.draft.lock().clone()
    }

    /// Log and publish a failure before handing it back to the caller
    fn surface<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!("Flow operation failed: {}", e);
            self.events.publish(FlowEvent::from_error(e));
        }
        result
    }

    // === Capture ===

    /// Open the camera; returns the uri of the new photo, if one was taken
    pub async fn take_photo(&self) -> Result<Option<String>> {
        let outcome = self.surface(self.camera.take_photo().await)?;
        match outcome {
            Some(CaptureOutcome::Captured(uri)) => {
                self.draft.lock().capture.capture_photo(uri.clone());
                info!("Photo attached: {}", uri);
                self.events.publish(FlowEvent::PhotoCaptured { uri: uri.clone() });
                Ok(Some(uri))
            }
            Some(CaptureOutcome::Cancelled) => {
                self.events.publish(FlowEvent::CaptureCancelled);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn remove_photo(&self) {
        self.draft.lock().capture.remove_photo();
        self.events.publish(FlowEvent::PhotoRemoved);
    }

    /// Returns false if a recording was already running
    pub async fn start_voice_recording(&self) -> Result<bool> {
        let started = self.surface(self.recorder.start().await)?;
        if started {
            self.events.publish(FlowEvent::RecordingStarted {
                language: self.recorder.language(),
            });
        }
        Ok(started)
    }

    /// Stop recording and attach the note to the draft
    ///
    /// A note that finishes after the flow was dismissed is dropped.
    pub async fn stop_voice_recording(&self) -> Result<Option<VoiceNote>> {
        let generation = self.recorder.generation();
        let Some(note) = self.surface(self.recorder.stop().await)? else {
            return Ok(None);
        };

        let mut draft = self.draft.lock();
        if self.recorder.generation() != generation {
            debug!("Discarding voice note finished after dismiss");
            return Ok(None);
        }
        draft.capture.attach_voice_note(note.clone());
        self.events.publish(FlowEvent::VoiceNoteRecorded {
            uri: note.uri.clone(),
            duration_secs: note.duration_secs,
        });
        Ok(Some(note))
    }

    pub async fn cancel_voice_recording(&self) -> bool {
        let cancelled = self.recorder.cancel().await;
        if cancelled {
            self.events.publish(FlowEvent::RecordingCancelled);
        }
        cancelled
    }

    pub fn remove_voice_note(&self) {
        self.draft.lock().capture.remove_voice_note();
        self.events.publish(FlowEvent::VoiceNoteRemoved);
    }

    pub fn set_voice_language(&self, language: VoiceLanguage) -> bool {
        self.recorder.set_language(language)
    }

    // === Location ===

    /// Fetch the device position and pre-fill the address
    ///
    /// Returns true if the draft was updated. A lookup already in flight, or
    /// a result that arrives after the location was cleared or the flow was
    /// dismissed, leaves the draft alone.
    pub async fn fetch_current_location(&self) -> Result<bool> {
        let outcome = self.surface(self.location.lookup().await)?;
        let LookupOutcome::Resolved { fix, ticket } = outcome else {
            return Ok(false);
        };

        let mut draft = self.draft.lock();
        if !self.location.is_current(ticket) {
            debug!("Discarding stale location result");
            return Ok(false);
        }
        draft.location.apply_fix(fix);
        self.events.publish(FlowEvent::LocationUpdated {
            coordinates: draft.location.coordinates,
            address: draft.location.address.clone(),
        });
        Ok(true)
    }

    pub fn edit_address(&self, text: impl Into<String>) {
        let mut draft = self.draft.lock();
        draft.location.edit_address(text);
        self.events.publish(FlowEvent::LocationUpdated {
            coordinates: draft.location.coordinates,
            address: draft.location.address.clone(),
        });
    }

    pub fn clear_location(&self) {
        let mut draft = self.draft.lock();
        self.location.invalidate();
        draft.location.clear();
        self.events.publish(FlowEvent::LocationCleared);
    }

    // === Details ===

    pub fn set_title(&self, title: impl Into<String>) {
        self.draft.lock().title = title.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.draft.lock().description = description.into();
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.draft.lock().category = category;
    }

    pub fn set_urgency(&self, urgency: Option<Urgency>) {
        self.draft.lock().urgency = urgency;
    }

    /// Override the configured award for the current draft
    pub fn set_point_award(&self, points: Option<u64>) {
        self.draft.lock().point_award = points;
    }

    // === Submission ===

    pub fn can_submit(&self) -> bool {
        self.draft.lock().can_submit(&self.config.submission_rules)
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        self.draft.lock().missing_fields(&self.config.submission_rules)
    }

    /// Validate, upload, then credit points and list the report
    ///
    /// Nothing changes unless every step succeeds. Returns `Ok(None)` when a
    /// submission is already in progress.
    pub async fn submit(&self) -> Result<Option<ReportRecord>> {
        let Some(_guard) = self.submitting.try_begin() else {
            debug!("Submission already in progress");
            return Ok(None);
        };

        let prepared = self.draft.lock().prepare(
            &self.config.submission_rules,
            self.config.points_per_report,
        );
        let record = self.surface(prepared)?;

        self.events.publish(FlowEvent::SubmissionStarted {
            report_id: record.id,
        });
        self.surface(self.uploader.upload(&record).await)?;

        {
            let mut draft = self.draft.lock();
            self.location.invalidate();
            draft.reset();
        }

        let balance = self.surface(self.ledger.credit_for(
            record.points,
            LedgerReason::ReportSubmitted {
                report_id: record.id,
            },
        ))?;
        let feed_id = self.feed.push(record.summary());

        info!(
            "Report {} submitted: \"{}\" at {} (+{} points)",
            record.id,
            record.title,
            record.address.trim(),
            record.points
        );
        self.events.publish(FlowEvent::ReportSubmitted {
            report: record.clone(),
            feed_id,
            balance,
        });
        Ok(Some(record))
    }

    // === Rewards ===

    pub fn redeem_reward(&self, reward_id: &str) -> Result<Redemption> {
        let redemption = self.surface(self.rewards.redeem(reward_id, &self.ledger))?;
        self.events
            .publish(FlowEvent::RewardRedeemed(redemption.clone()));
        Ok(redemption)
    }

    /// Leave the report screen: drop the draft, any recording and any
    /// pending location result
    pub async fn dismiss(&self) {
        {
            let mut draft = self.draft.lock();
            self.location.invalidate();
            self.recorder.invalidate();
            draft.reset();
        }
        self.recorder.cancel().await;
        debug!("Report flow dismissed");
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let draft = self.draft.lock();
        FlowSnapshot {
            capture: draft.capture.state(),
            photo_uri: draft.capture.photo_uri().map(str::to_string),
            voice_uri: draft.capture.voice_uri().map(str::to_string),
            location_visible: draft.capture.location_step_visible(),
            coordinates: draft.location.coordinates,
            address: draft.location.address.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category,
            urgency: draft.urgency,
            can_submit: draft.can_submit(&self.config.submission_rules),
            missing: draft.missing_fields(&self.config.submission_rules),
            recording: self.recorder.state(),
            voice_language: self.recorder.language(),
            locating: self.location.is_in_flight(),
            submitting: self.submitting.is_active(),
            balance: self.ledger.balance(),
            recent_reports: self.feed.items(),
        }
    }
}

/// Builder for a [`ReportFlow`]
///
/// Providers that are not set fall back to the simulated ones.
pub struct ReportFlowBuilder {
    config: EcoReportConfig,
    camera: Option<Arc<dyn CameraProvider>>,
    recorder: Option<Arc<dyn AudioRecorderProvider>>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    uploader: Option<Arc<dyn ReportUploader>>,
    ledger: Option<PointsLedger>,
    feed: Option<RecentReportsFeed>,
    rewards: RewardCatalog,
}

impl ReportFlowBuilder {
    pub fn new() -> Self {
        Self {
            config: EcoReportConfig::default(),
            camera: None,
            recorder: None,
            geolocation: None,
            uploader: None,
            ledger: None,
            feed: None,
            rewards: RewardCatalog::default(),
        }
    }

    pub fn with_config(mut self, config: EcoReportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraProvider>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn AudioRecorderProvider>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_geolocation(mut self, geolocation: Arc<dyn GeolocationProvider>) -> Self {
        self.geolocation = Some(geolocation);
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn ReportUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Share a ledger with other flows instead of creating one from config
    pub fn with_ledger(mut self, ledger: PointsLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_feed(mut self, feed: RecentReportsFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_rewards(mut self, rewards: RewardCatalog) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn build(self) -> Result<ReportFlow> {
        self.config.validate()?;
        let config = self.config;

        let camera: Arc<dyn CameraProvider> = match self.camera {
            Some(camera) => camera,
            None => Arc::new(SimulatedCamera::new()),
        };
        let recorder: Arc<dyn AudioRecorderProvider> = match self.recorder {
            Some(recorder) => recorder,
            None => Arc::new(SimulatedRecorder::new()),
        };
        let geolocation: Arc<dyn GeolocationProvider> = match self.geolocation {
            Some(geolocation) => geolocation,
            None => Arc::new(SimulatedGeolocation::new()),
        };
        let uploader: Arc<dyn ReportUploader> = match self.uploader {
            Some(uploader) => uploader,
            None => Arc::new(SimulatedUploader::new(config.upload_delay)),
        };
        let ledger = self
            .ledger
            .unwrap_or_else(|| PointsLedger::new(config.starting_balance));
        let feed = self
            .feed
            .unwrap_or_else(|| RecentReportsFeed::with_capacity(config.feed_capacity));

        Ok(ReportFlow {
            draft: Mutex::new(ReportDraft::new()),
            camera: PhotoCapture::new(camera),
            recorder: VoiceRecorder::new(recorder).with_language(config.voice_language),
            location: LocationLookup::new(geolocation),
            uploader,
            ledger,
            feed,
            rewards: self.rewards,
            submitting: InFlight::new(),
            events: EventChannel::default(),
            config,
        })
    }
}

impl Default for ReportFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureState;
    use crate::EcoReportError;

    fn flow() -> ReportFlow {
        ReportFlow::builder()
            .with_config(EcoReportConfig::default().without_upload_delay())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = ReportFlow::builder()
            .with_config(EcoReportConfig::default().with_points_per_report(0))
            .build();
        assert!(matches!(result, Err(EcoReportError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_photo_reveals_location_step() {
        let flow = flow();
        assert!(!flow.snapshot().location_visible);

        let uri = flow.take_photo().await.unwrap();
        assert_eq!(uri.as_deref(), Some("img://1"));

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.capture, CaptureState::HasPhoto);
        assert!(snapshot.location_visible);
        assert!(!snapshot.can_submit);
        assert_eq!(snapshot.missing, vec![RequiredField::Address]);
    }

    #[tokio::test]
    async fn test_validation_error_is_published() {
        let flow = flow();
        let events = flow.events();

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, EcoReportError::Validation(_)));
        assert!(events.try_iter().any(|event| event.is_error()));
        assert_eq!(flow.ledger().balance(), 1250);
    }

    #[tokio::test]
    async fn test_snapshot_defaults() {
        let flow = flow();
        let snapshot = flow.snapshot();
        assert_eq!(snapshot.balance, 1250);
        assert!(snapshot.recent_reports.is_empty());
        assert!(snapshot.recording.is_idle());
        assert!(!snapshot.submitting);
        assert!(!snapshot.locating);
    }
}
