use crate::capture::VoiceNote;
use crate::location::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Waste issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Overflowing,
    Broken,
    Illegal,
    Recycling,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Overflowing,
        Category::Broken,
        Category::Illegal,
        Category::Recycling,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Overflowing => "Overflowing Bin",
            Category::Broken => "Broken Container",
            Category::Illegal => "Illegal Dumping",
            Category::Recycling => "Recycling Issue",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Urgency::Low => "Minor issue",
            Urgency::Medium => "Moderate concern",
            Urgency::High => "Urgent attention needed",
        }
    }
}

/// How the report was made, judged by its primary artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    Photo,
    Voice,
    Text,
}

impl ReportKind {
    pub fn default_title(&self) -> &'static str {
        match self {
            ReportKind::Photo => "Photo Report",
            ReportKind::Voice => "Voice Report",
            ReportKind::Text => "Text Report",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportStatus {
    #[default]
    UnderReview,
    InProgress,
    Resolved,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::UnderReview => write!(f, "Under Review"),
            ReportStatus::InProgress => write!(f, "In Progress"),
            ReportStatus::Resolved => write!(f, "Resolved"),
        }
    }
}

/// A submitted report. Never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: Uuid,
    pub title: String,
    pub kind: ReportKind,
    pub description: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub photo_uri: Option<String>,
    pub voice_note: Option<VoiceNote>,
    pub captured_at: DateTime<Utc>,
    pub points: u64,
    pub status: ReportStatus,
}

impl ReportRecord {
    /// Condensed form shown in the recent reports list
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: None,
            title: self.title.clone(),
            location: self.address.trim().to_string(),
            time: self.captured_at,
            status: self.status,
            kind: self.kind,
            points: self.points,
            image: self.photo_uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Assigned by the feed when left empty
    pub id: Option<u64>,
    pub title: String,
    pub location: String,
    pub time: DateTime<Utc>,
    pub status: ReportStatus,
    pub kind: ReportKind,
    pub points: u64,
    pub image: Option<String>,
}

impl ReportSummary {
    pub fn new(title: impl Into<String>, location: impl Into<String>, points: u64) -> Self {
        Self {
            id: None,
            title: title.into(),
            location: location.into(),
            time: Utc::now(),
            status: ReportStatus::default(),
            kind: ReportKind::Photo,
            points,
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ReportStatus::default().to_string(), "Under Review");
        assert_eq!(ReportStatus::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_category_labels() {
        let labels: Vec<_> = Category::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Overflowing Bin",
                "Broken Container",
                "Illegal Dumping",
                "Recycling Issue",
                "Other"
            ]
        );
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let mut summary = ReportSummary::new("Overflowing Bin", "Main Street", 50);
        summary.id = Some(1000);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], 1000);
        assert_eq!(json["status"], "underReview");
        assert_eq!(json["points"], 50);
        assert!(json["image"].is_null());
    }
}
