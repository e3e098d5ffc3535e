pub mod ledger;
pub mod rewards;

pub use ledger::{
    EntryKind, LedgerEntry, LedgerReason, PointsLedger, DEFAULT_STARTING_BALANCE,
    LEDGER_HISTORY_LIMIT,
};
pub use rewards::{Redemption, Reward, RewardCatalog};
