//! Streak reward claim document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for streak reward claims
pub const STREAK_REWARD_COLLECTION: &str = "streak_rewards";

/// Streak reward claim document stored in MongoDB
///
/// Wallet addresses are stored lowercased so lookups are
/// case-insensitive.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StreakRewardDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Claimant wallet address (lowercased)
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,

    /// When the reward was last claimed
    #[serde(rename = "lastClaimDate")]
    pub last_claim_date: DateTime,

    /// When the next claim becomes possible
    #[serde(rename = "nextEligibleDate")]
    pub next_eligible_date: DateTime,

    /// Transaction hash of the last claim
    #[serde(rename = "lastTransactionHash", skip_serializing_if = "Option::is_none")]
    pub last_transaction_hash: Option<String>,
}

impl IntoIndexes for StreakRewardDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "walletAddress": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("wallet_address_unique".to_string())
                    .build(),
            ),
        )]
    }
}
