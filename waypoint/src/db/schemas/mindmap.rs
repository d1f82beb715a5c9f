//! Mindmap document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for mindmaps
pub const MINDMAP_COLLECTION: &str = "mindmaps";

/// Mindmap document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MindmapDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Topic the mindmap describes
    pub topic: String,

    /// Mermaid mindmap source, fence-stripped
    #[serde(rename = "mermaidCode")]
    pub mermaid_code: String,

    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl MindmapDoc {
    /// Create a new mindmap document
    pub fn new(
        google_id: impl Into<String>,
        topic: impl Into<String>,
        mermaid_code: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            google_id: google_id.into(),
            topic: topic.into(),
            mermaid_code: mermaid_code.into(),
            created_at: DateTime::now(),
        }
    }
}

impl IntoIndexes for MindmapDoc {
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
