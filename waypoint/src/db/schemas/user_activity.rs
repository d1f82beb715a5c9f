//! Daily activity document schema
//!
//! One document per (user, midnight-UTC day), maintained by upsert so
//! repeated same-day activity stays a single record.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for daily activity
pub const USER_ACTIVITY_COLLECTION: &str = "user_activity";

/// Daily activity document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserActivityDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Day of activity, truncated to midnight UTC
    pub date: DateTime,
}

impl IntoIndexes for UserActivityDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One record per user per day
            (
                doc! { "googleId": 1, "date": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("google_id_date_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
