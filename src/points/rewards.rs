use super::ledger::{LedgerReason, PointsLedger};
use crate::{EcoReportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub cost: u64,
    pub description: String,
}

impl Reward {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: u64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: Uuid,
    pub reward: Reward,
    pub balance_after: u64,
    pub redeemed_at: DateTime<Utc>,
}

/// Rewards the points can be spent on
#[derive(Debug, Clone)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl Default for RewardCatalog {
    fn default() -> Self {
        Self::new(vec![
            Reward::new("airtime", "Airtime", 500, "R50 airtime voucher"),
            Reward::new("movie", "Movie Ticket", 800, "Cinema movie ticket"),
            Reward::new("voucher", "Voucher", 1000, "R100 shopping voucher"),
            Reward::new("groceries", "Groceries", 1500, "R150 grocery voucher"),
        ])
    }
}

impl RewardCatalog {
    pub fn new(rewards: Vec<Reward>) -> Self {
        Self { rewards }
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn get(&self, id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|reward| reward.id == id)
    }

    /// Rewards the balance covers
    pub fn affordable(&self, balance: u64) -> Vec<&Reward> {
        self.rewards
            .iter()
            .filter(|reward| reward.cost <= balance)
            .collect()
    }

    pub fn redeem(&self, id: &str, ledger: &PointsLedger) -> Result<Redemption> {
        let reward = self
            .get(id)
            .ok_or_else(|| EcoReportError::UnknownReward(id.to_string()))?;

        let balance_after = ledger.debit_for(
            reward.cost,
            LedgerReason::RewardRedeemed {
                reward_id: reward.id.clone(),
            },
        )?;
        info!("Redeemed {} for {} points", reward.name, reward.cost);

        Ok(Redemption {
            id: Uuid::new_v4(),
            reward: reward.clone(),
            balance_after,
            redeemed_at: Utc::now(),
        })
    }
}
