//! Configuration for the report flow
//!
//! Point awards and required fields differ between report screens, so they
//! are settings here instead of constants in the flow.

use crate::capture::VoiceLanguage;
use crate::feed::RECENT_REPORTS_CAPACITY;
use crate::points::DEFAULT_STARTING_BALANCE;
use crate::report::SubmissionRules;
use crate::{EcoReportError, Result};
use std::env;
use std::time::Duration;

/// Points credited for a submitted report unless the draft overrides it
pub const DEFAULT_POINTS_PER_REPORT: u64 = 50;

#[derive(Clone, Debug)]
pub struct EcoReportConfig {
    /// Ledger balance at process start
    pub starting_balance: u64,

    /// Default award per submitted report
    pub points_per_report: u64,

    /// How many submitted reports the recent list keeps
    pub feed_capacity: usize,

    /// Fields a draft needs before it can be submitted
    pub submission_rules: SubmissionRules,

    /// Delay of the simulated upload
    pub upload_delay: Duration,

    /// Language preselected for voice notes
    pub voice_language: VoiceLanguage,
}

impl Default for EcoReportConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            points_per_report: DEFAULT_POINTS_PER_REPORT,
            feed_capacity: RECENT_REPORTS_CAPACITY,
            submission_rules: SubmissionRules::default(),
            upload_delay: Duration::from_millis(1500),
            voice_language: VoiceLanguage::default(),
        }
    }
}

impl EcoReportConfig {
    /// Defaults overridden by `ECOREPORT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(balance) = env_u64("ECOREPORT_STARTING_BALANCE")? {
            config.starting_balance = balance;
        }
        if let Some(points) = env_u64("ECOREPORT_POINTS_PER_REPORT")? {
            config.points_per_report = points;
        }
        if let Some(ms) = env_u64("ECOREPORT_UPLOAD_DELAY_MS")? {
            config.upload_delay = Duration::from_millis(ms);
        }
        if let Ok(value) = env::var("ECOREPORT_REQUIRE_DESCRIPTION") {
            let required = value == "1" || value.eq_ignore_ascii_case("true");
            config.submission_rules = config.submission_rules.with_description_required(required);
        }
        if let Ok(code) = env::var("ECOREPORT_VOICE_LANGUAGE") {
            config.voice_language = VoiceLanguage::from_code(&code).ok_or_else(|| {
                EcoReportError::ConfigError(format!("Unknown voice language: {}", code))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_starting_balance(mut self, balance: u64) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_points_per_report(mut self, points: u64) -> Self {
        self.points_per_report = points;
        self
    }

    pub fn with_submission_rules(mut self, rules: SubmissionRules) -> Self {
        self.submission_rules = rules;
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    /// No simulated upload delay (tests, demos)
    pub fn without_upload_delay(mut self) -> Self {
        self.upload_delay = Duration::ZERO;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.points_per_report == 0 {
            return Err(EcoReportError::ConfigError(
                "points_per_report must be greater than zero".to_string(),
            ));
        }
        if self.feed_capacity == 0 || self.feed_capacity > RECENT_REPORTS_CAPACITY {
            return Err(EcoReportError::ConfigError(format!(
                "feed_capacity must be between 1 and {}",
                RECENT_REPORTS_CAPACITY
            )));
        }
        Ok(())
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EcoReportError::ConfigError(format!("{} must be a number, got {:?}", key, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EcoReportConfig::default();
        assert_eq!(config.starting_balance, 1250);
        assert_eq!(config.points_per_report, 50);
        assert_eq!(config.feed_capacity, 3);
        assert_eq!(config.submission_rules, SubmissionRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EcoReportConfig::default()
            .with_starting_balance(0)
            .with_points_per_report(75)
            .without_upload_delay();

        assert_eq!(config.starting_balance, 0);
        assert_eq!(config.points_per_report, 75);
        assert!(config.upload_delay.is_zero());
    }

    #[test]
    fn test_invalid_config() {
        assert!(EcoReportConfig::default()
            .with_points_per_report(0)
            .validate()
            .is_err());
        assert!(EcoReportConfig::default()
            .with_feed_capacity(4)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_env() {
        env::set_var("ECOREPORT_STARTING_BALANCE", "300");
        env::set_var("ECOREPORT_REQUIRE_DESCRIPTION", "true");
        let config = EcoReportConfig::from_env().unwrap();
        env::remove_var("ECOREPORT_STARTING_BALANCE");
        env::remove_var("ECOREPORT_REQUIRE_DESCRIPTION");

        assert_eq!(config.starting_balance, 300);
        assert!(config.submission_rules.require_description);
    }
}
