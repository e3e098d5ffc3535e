pub mod storage;

pub use storage::{RecentReportsFeed, FIRST_FEED_ID, RECENT_REPORTS_CAPACITY};
