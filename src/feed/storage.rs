use crate::report::ReportSummary;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Number of reports kept in the recent list
pub const RECENT_REPORTS_CAPACITY: usize = 3;

/// First id handed out to summaries pushed without one
pub const FIRST_FEED_ID: u64 = 1000;

/// Most-recent-first list of submitted reports
#[derive(Debug, Clone)]
pub struct RecentReportsFeed {
    items: Arc<RwLock<VecDeque<ReportSummary>>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl RecentReportsFeed {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_REPORTS_CAPACITY)
    }

    /// Feed showing fewer reports; clamped to `1..=RECENT_REPORTS_CAPACITY`
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, RECENT_REPORTS_CAPACITY);
        Self {
            items: Arc::new(RwLock::new(VecDeque::with_capacity(capacity + 1))),
            next_id: Arc::new(AtomicU64::new(FIRST_FEED_ID)),
            capacity,
        }
    }

    /// Prepend a summary, evicting the oldest beyond capacity
    ///
    /// Returns the id the summary is listed under.
    pub fn push(&self, mut summary: ReportSummary) -> u64 {
        let id = match summary.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        summary.id = Some(id);

        let mut items = self.items.write();
        items.push_front(summary);
        items.truncate(self.capacity);
        id
    }

    pub fn items(&self) -> Vec<ReportSummary> {
        self.items.read().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<ReportSummary> {
        self.items.read().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentReportsFeed {
    fn default() -> Self {
        Self::new()
    }
}
