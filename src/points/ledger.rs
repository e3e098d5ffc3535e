//! Points balance
//!
//! The balance is the only state shared by report submission and reward
//! redemption. All mutations go through one mutex so the check-then-act in
//! [`PointsLedger::debit`] cannot interleave with another writer.

use crate::{EcoReportError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Balance shown in the app before any activity
pub const DEFAULT_STARTING_BALANCE: u64 = 1250;

/// Entries kept in the ledger history; older ones are dropped first
pub const LEDGER_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Credit,
    Debit,
}

/// Why the balance moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum LedgerReason {
    ReportSubmitted { report_id: Uuid },
    RewardRedeemed { reward_id: String },
    Adjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub kind: EntryKind,
    pub amount: u64,
    pub reason: LedgerReason,
    pub balance_after: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
struct LedgerState {
    balance: u64,
    history: VecDeque<LedgerEntry>,
}

/// Shared handle; clones see the same balance
#[derive(Debug, Clone)]
pub struct PointsLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl Default for PointsLedger {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

impl PointsLedger {
    pub fn new(starting_balance: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                balance: starting_balance,
                history: VecDeque::new(),
            })),
        }
    }

    pub fn balance(&self) -> u64 {
        self.inner.lock().balance
    }

    pub fn credit(&self, amount: u64) -> Result<u64> {
        self.credit_for(amount, LedgerReason::Adjustment)
    }

    pub fn debit(&self, amount: u64) -> Result<u64> {
        self.debit_for(amount, LedgerReason::Adjustment)
    }

    /// Add points and return the new balance
    pub fn credit_for(&self, amount: u64, reason: LedgerReason) -> Result<u64> {
        if amount == 0 {
            return Err(EcoReportError::InvalidAmount(amount));
        }
        let mut state = self.inner.lock();
        state.balance = state.balance.saturating_add(amount);
        let balance = state.balance;
        state.record(EntryKind::Credit, amount, reason);
        info!("Credited {} points, balance {}", amount, balance);
        Ok(balance)
    }

    /// Remove points and return the new balance
    ///
    /// Rejected, never clamped, when the balance is too small; a rejected
    /// debit leaves the balance and history untouched.
    pub fn debit_for(&self, amount: u64, reason: LedgerReason) -> Result<u64> {
        if amount == 0 {
            return Err(EcoReportError::InvalidAmount(amount));
        }
        let mut state = self.inner.lock();
        if state.balance < amount {
            debug!("Debit of {} rejected, balance {}", amount, state.balance);
            return Err(EcoReportError::InsufficientPoints {
                balance: state.balance,
                requested: amount,
                shortfall: amount - state.balance,
            });
        }
        state.balance -= amount;
        let balance = state.balance;
        state.record(EntryKind::Debit, amount, reason);
        info!("Debited {} points, balance {}", amount, balance);
        Ok(balance)
    }

    /// Most recent applied entries, oldest first
    pub fn history(&self) -> Vec<LedgerEntry> {
        self.inner.lock().history.iter().cloned().collect()
    }
}

impl LedgerState {
    fn record(&mut self, kind: EntryKind, amount: u64, reason: LedgerReason) {
        self.history.push_back(LedgerEntry {
            kind,
            amount,
            reason,
            balance_after: self.balance,
            at: Utc::now(),
        });
        while self.history.len() > LEDGER_HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}
