//! Report draft and submission gate

use super::types::{Category, ReportKind, ReportRecord, ReportStatus, Urgency};
use crate::capture::CaptureSession;
use crate::location::LocationAttachment;
use crate::{EcoReportError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A condition that blocks submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredField {
    /// At least one photo or voice note
    Capture,
    Address,
    Description,
    Title,
    Category,
    Urgency,
}

impl RequiredField {
    fn prompt(&self) -> &'static str {
        match self {
            RequiredField::Capture => "a photo or voice note",
            RequiredField::Address => "a location",
            RequiredField::Description => "a description",
            RequiredField::Title => "a title",
            RequiredField::Category => "a category",
            RequiredField::Urgency => "an urgency level",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredField::Capture => write!(f, "capture"),
            RequiredField::Address => write!(f, "address"),
            RequiredField::Description => write!(f, "description"),
            RequiredField::Title => write!(f, "title"),
            RequiredField::Category => write!(f, "category"),
            RequiredField::Urgency => write!(f, "urgency"),
        }
    }
}

/// Every field that was missing when submission was attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub missing: Vec<RequiredField>,
}

impl ValidationFailure {
    pub fn new(missing: Vec<RequiredField>) -> Self {
        Self { missing }
    }

    pub fn is_missing(&self, field: RequiredField) -> bool {
        self.missing.contains(&field)
    }

    pub fn user_message(&self) -> String {
        let prompts: Vec<_> = self.missing.iter().map(|field| field.prompt()).collect();
        format!("Please provide {}.", prompts.join(", "))
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.missing.iter().map(|field| field.to_string()).collect();
        write!(f, "missing {}", names.join(", "))
    }
}

/// Which fields must be filled before a draft can be submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRules {
    pub require_capture: bool,
    pub require_address: bool,
    pub require_description: bool,
    pub require_title: bool,
    pub require_category: bool,
    pub require_urgency: bool,
}

impl Default for SubmissionRules {
    /// Photo or voice note, plus a location
    fn default() -> Self {
        Self {
            require_capture: true,
            require_address: true,
            require_description: false,
            require_title: false,
            require_category: false,
            require_urgency: false,
        }
    }
}

impl SubmissionRules {
    /// Photo screen: capture, description and location
    pub fn photo_report() -> Self {
        Self {
            require_description: true,
            ..Self::default()
        }
    }

    /// Written report: no media, everything else required
    pub fn text_report() -> Self {
        Self {
            require_capture: false,
            require_address: true,
            require_description: true,
            require_title: true,
            require_category: true,
            require_urgency: true,
        }
    }

    pub fn with_description_required(mut self, required: bool) -> Self {
        self.require_description = required;
        self
    }
}

/// An in-progress report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub capture: CaptureSession,
    pub location: LocationAttachment,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    /// Overrides the configured award for this report only
    pub point_award: Option<u64>,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields the rules require that are still empty, in form order
    pub fn missing_fields(&self, rules: &SubmissionRules) -> Vec<RequiredField> {
        let has_capture = self.capture.has_photo() || self.capture.has_voice_note();
        let checks = [
            (rules.require_capture && !has_capture, RequiredField::Capture),
            (rules.require_title && self.title.trim().is_empty(), RequiredField::Title),
            (rules.require_category && self.category.is_none(), RequiredField::Category),
            (rules.require_urgency && self.urgency.is_none(), RequiredField::Urgency),
            (
                rules.require_description && self.description.trim().is_empty(),
                RequiredField::Description,
            ),
            (rules.require_address && !self.location.has_address(), RequiredField::Address),
        ];
        checks
            .into_iter()
            .filter_map(|(missing, field)| missing.then_some(field))
            .collect()
    }

    pub fn can_submit(&self, rules: &SubmissionRules) -> bool {
        self.missing_fields(rules).is_empty()
    }

    pub fn kind(&self) -> ReportKind {
        if self.capture.has_photo() {
            ReportKind::Photo
        } else if self.capture.has_voice_note() {
            ReportKind::Voice
        } else {
            ReportKind::Text
        }
    }

    /// Title shown for the report: typed title, else category, else kind
    pub fn effective_title(&self) -> String {
        let typed = self.title.trim();
        if !typed.is_empty() {
            return typed.to_string();
        }
        match self.category {
            Some(category) => category.label().to_string(),
            None => self.kind().default_title().to_string(),
        }
    }

    /// Validate and build the record without touching the draft
    pub fn prepare(&self, rules: &SubmissionRules, default_award: u64) -> Result<ReportRecord> {
        let missing = self.missing_fields(rules);
        if !missing.is_empty() {
            return Err(EcoReportError::Validation(ValidationFailure::new(missing)));
        }

        let points = self.point_award.unwrap_or(default_award);
        if points == 0 {
            return Err(EcoReportError::InvalidAmount(points));
        }

        Ok(ReportRecord {
            id: Uuid::new_v4(),
            title: self.effective_title(),
            kind: self.kind(),
            description: self.description.trim().to_string(),
            category: self.category,
            urgency: self.urgency,
            address: self.location.address.clone(),
            coordinates: self.location.coordinates,
            photo_uri: self.capture.photo_uri().map(str::to_string),
            voice_note: self.capture.voice_note().cloned(),
            captured_at: Utc::now(),
            points,
            status: ReportStatus::UnderReview,
        })
    }

    /// Validate, build the record and reset the draft. All or nothing.
    pub fn submit(&mut self, rules: &SubmissionRules, default_award: u64) -> Result<ReportRecord> {
        let record = self.prepare(rules, default_award)?;
        self.reset();
        Ok(record)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Coordinates;

    #[test]
    fn test_capture_and_address_required() {
        let rules = SubmissionRules::default();
        let mut draft = ReportDraft::new();
        assert_eq!(
            draft.missing_fields(&rules),
            vec![RequiredField::Capture, RequiredField::Address]
        );

        draft.capture.capture_photo("img://1");
        assert!(!draft.can_submit(&rules));

        draft.location.edit_address("12 Main St");
        assert!(draft.can_submit(&rules));
    }

    #[test]
    fn test_whitespace_address_rejected() {
        let rules = SubmissionRules::default();
        let mut draft = ReportDraft::new();
        draft.capture.record_voice_note("audio://1");
        draft.location.edit_address(" \t ");
        assert_eq!(draft.missing_fields(&rules), vec![RequiredField::Address]);
    }

    #[test]
    fn test_submit_resets_draft() {
        let rules = SubmissionRules::default();
        let mut draft = ReportDraft::new();
        draft.capture.capture_photo("img://1");
        draft.location.apply_fix(crate::location::LocationFix {
            coordinates: Coordinates::new(-26.2, 28.04),
            address: Some("Jorissen St, Johannesburg".to_string()),
        });
        draft.description = "Bin overflowing onto the pavement ".to_string();

        let record = draft.submit(&rules, 50).unwrap();
        assert_eq!(record.points, 50);
        assert_eq!(record.kind, ReportKind::Photo);
        assert_eq!(record.title, "Photo Report");
        assert_eq!(record.address, "Jorissen St, Johannesburg");
        assert_eq!(record.description, "Bin overflowing onto the pavement");
        assert_eq!(record.photo_uri.as_deref(), Some("img://1"));
        assert_eq!(record.status, ReportStatus::UnderReview);
        assert!(draft.is_empty());
        assert!(!draft.can_submit(&rules));
    }

    #[test]
    fn test_failed_submit_changes_nothing() {
        let rules = SubmissionRules::default();
        let mut draft = ReportDraft::new();
        draft.location.edit_address("12 Main St");
        let before = draft.clone();

        let err = draft.submit(&rules, 50).unwrap_err();
        match err {
            EcoReportError::Validation(failure) => {
                assert!(failure.is_missing(RequiredField::Capture));
                assert!(!failure.is_missing(RequiredField::Address));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(draft, before);
    }

    #[test]
    fn test_point_override() {
        let mut draft = ReportDraft::new();
        draft.capture.capture_photo("img://1");
        draft.location.edit_address("Beach Rd");
        draft.point_award = Some(75);
        let record = draft.prepare(&SubmissionRules::default(), 50).unwrap();
        assert_eq!(record.points, 75);
    }

    #[test]
    fn test_zero_award_rejected() {
        let mut draft = ReportDraft::new();
        draft.capture.capture_photo("img://1");
        draft.location.edit_address("Beach Rd");
        draft.point_award = Some(0);
        assert_eq!(
            draft.prepare(&SubmissionRules::default(), 50).unwrap_err(),
            EcoReportError::InvalidAmount(0)
        );
    }

    #[test]
    fn test_text_report_rules() {
        let rules = SubmissionRules::text_report();
        let mut draft = ReportDraft::new();
        draft.location.edit_address("Main Street");
        assert_eq!(
            draft.missing_fields(&rules),
            vec![
                RequiredField::Title,
                RequiredField::Category,
                RequiredField::Urgency,
                RequiredField::Description
            ]
        );

        draft.title = "Broken lid".to_string();
        draft.category = Some(Category::Broken);
        draft.urgency = Some(Urgency::Medium);
        draft.description = "Lid snapped off".to_string();
        let record = draft.prepare(&rules, 30).unwrap();
        assert_eq!(record.kind, ReportKind::Text);
        assert_eq!(record.title, "Broken lid");
    }

    #[test]
    fn test_photo_report_requires_description() {
        let rules = SubmissionRules::photo_report();
        let mut draft = ReportDraft::new();
        draft.capture.capture_photo("img://1");
        draft.location.edit_address("Main Street");
        assert_eq!(draft.missing_fields(&rules), vec![RequiredField::Description]);
    }

    #[test]
    fn test_title_falls_back_to_category() {
        let mut draft = ReportDraft::new();
        draft.capture.record_voice_note("audio://1");
        assert_eq!(draft.effective_title(), "Voice Report");
        draft.category = Some(Category::Illegal);
        assert_eq!(draft.effective_title(), "Illegal Dumping");
    }
}
