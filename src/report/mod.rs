pub mod draft;
pub mod types;

pub use draft::{ReportDraft, RequiredField, SubmissionRules, ValidationFailure};
pub use types::{Category, ReportKind, ReportRecord, ReportStatus, ReportSummary, Urgency};
