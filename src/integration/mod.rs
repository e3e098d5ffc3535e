//! Integration layer
//!
//! Composes capture, location, ledger and feed into the report flow.

pub mod config;
pub mod events;
pub mod flow;

pub use config::{EcoReportConfig, DEFAULT_POINTS_PER_REPORT};
pub use events::{FlowEvent, FlowSnapshot};
pub use flow::{ReportFlow, ReportFlowBuilder};
