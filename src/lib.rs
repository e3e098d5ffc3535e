pub mod capture;
pub mod feed;
pub mod integration;
pub mod location;
pub mod points;
pub mod providers;
pub mod report;
pub mod utils;

use crate::providers::Capability;
use crate::report::ValidationFailure;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EcoReportError {
    #[error("{0} permission denied")]
    PermissionDenied(Capability),

    #[error("{capability} operation failed: {message}")]
    DeviceOperation {
        capability: Capability,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(ValidationFailure),

    #[error("Insufficient points: balance {balance}, requested {requested} (short by {shortfall})")]
    InsufficientPoints {
        balance: u64,
        requested: u64,
        shortfall: u64,
    },

    #[error("Invalid point amount: {0}")]
    InvalidAmount(u64),

    #[error("Unknown reward: {0}")]
    UnknownReward(String),

    #[error("Upload error: {0}")]
    UploadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EcoReportError {
    /// Shorthand for a failed device call
    pub fn device(capability: Capability, message: impl Into<String>) -> Self {
        EcoReportError::DeviceOperation {
            capability,
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user has to re-trigger the action after granting access
            EcoReportError::PermissionDenied(_) => true,
            // Device calls leave the draft untouched, so a retry is safe
            EcoReportError::DeviceOperation { .. } => true,
            EcoReportError::Validation(_) => true,
            EcoReportError::InsufficientPoints { .. } => true,
            EcoReportError::InvalidAmount(_) => false,
            EcoReportError::UnknownReward(_) => false,
            EcoReportError::UploadError(_) => true,
            EcoReportError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            EcoReportError::PermissionDenied(capability) => {
                format!("{} permission is required to continue.", capability)
            }
            EcoReportError::DeviceOperation { capability, .. } => match capability {
                Capability::Camera => "Failed to take photo. Please try again.".to_string(),
                Capability::Microphone => "Failed to record audio. Please try again.".to_string(),
                Capability::Location => {
                    "Failed to get current location. Please try again.".to_string()
                }
            },
            EcoReportError::Validation(failure) => failure.user_message(),
            EcoReportError::InsufficientPoints { shortfall, .. } => {
                format!("You need {} more points to redeem this reward.", shortfall)
            }
            EcoReportError::InvalidAmount(_) => "Invalid points amount.".to_string(),
            EcoReportError::UnknownReward(_) => "This reward is no longer available.".to_string(),
            EcoReportError::UploadError(_) => {
                "Your report could not be submitted. Please try again.".to_string()
            }
            EcoReportError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EcoReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RequiredField;

    #[test]
    fn test_insufficient_points_message() {
        let err = EcoReportError::InsufficientPoints {
            balance: 1250,
            requested: 1500,
            shortfall: 250,
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.user_message(),
            "You need 250 more points to redeem this reward."
        );
        assert!(err.to_string().contains("short by 250"));
    }

    #[test]
    fn test_validation_message_names_fields() {
        let err = EcoReportError::Validation(ValidationFailure::new(vec![
            RequiredField::Capture,
            RequiredField::Address,
        ]));
        let message = err.user_message();
        assert!(message.contains("photo or voice note"));
        assert!(message.contains("location"));
    }

    #[test]
    fn test_device_error_per_capability() {
        let err = EcoReportError::device(Capability::Location, "timeout");
        assert_eq!(
            err.user_message(),
            "Failed to get current location. Please try again."
        );
        assert_eq!(err.to_string(), "Location operation failed: timeout");
    }
}
