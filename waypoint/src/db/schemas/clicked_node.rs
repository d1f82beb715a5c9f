//! Clicked node document schema
//!
//! Append-only record of node clicks. Duplicates are allowed: only the
//! set of distinct labels is consumed by enhancement.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for clicked nodes
pub const CLICKED_NODE_COLLECTION: &str = "clicked_nodes";

/// Clicked node document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ClickedNodeDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Mindmap topic
    pub topic: String,

    /// Clicked concept label
    #[serde(rename = "nodeText")]
    pub node_text: String,

    /// Click timestamp
    #[serde(rename = "clickedAt")]
    pub clicked_at: DateTime,
}

impl ClickedNodeDoc {
    /// Create a new click record
    pub fn new(
        google_id: impl Into<String>,
        topic: impl Into<String>,
        node_text: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            google_id: google_id.into(),
            topic: topic.into(),
            node_text: node_text.into(),
            clicked_at: DateTime::now(),
        }
    }
}

impl IntoIndexes for ClickedNodeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "googleId": 1, "topic": 1 },
            Some(
                IndexOptions::builder()
                    .name("google_id_topic_index".to_string())
                    .build(),
            ),
        )]
    }
}
