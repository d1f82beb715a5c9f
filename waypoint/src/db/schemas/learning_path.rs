//! Learning path document schema
//!
//! One learning path per (user, topic), owning an ordered sequence of
//! concept nodes derived from the topic's mindmap. Node priorities and
//! resources are replaced wholesale by each enhancement pass; status is
//! only changed by explicit status-update requests.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for learning paths
pub const LEARNING_PATH_COLLECTION: &str = "learning_paths";

/// Progress status of a single concept node.
///
/// Never reverts automatically; initial value is `NotStarted`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    NotStarted,
    InProgress,
    Mastered,
}

/// One entry in a learning path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConceptNode {
    /// Concept label extracted from the mindmap
    #[serde(rename = "nodeText")]
    pub node_text: String,

    /// Progress status
    #[serde(default)]
    pub status: NodeStatus,

    /// Learning priority, 0 until an enhancement pass assigns one
    #[serde(default)]
    pub priority: i32,

    /// Suggested learning resources, replaced wholesale on enhancement
    #[serde(rename = "recommendedResources", default)]
    pub recommended_resources: Vec<String>,
}

impl ConceptNode {
    /// Create a fresh node for a concept label
    pub fn new(node_text: impl Into<String>) -> Self {
        Self {
            node_text: node_text.into(),
            status: NodeStatus::NotStarted,
            priority: 0,
            recommended_resources: Vec::new(),
        }
    }
}

/// Learning path document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LearningPathDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Mindmap topic this path belongs to
    pub topic: String,

    /// Ordered concept nodes (document order of the source diagram)
    pub nodes: Vec<ConceptNode>,

    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,

    /// Last mutation timestamp (status update or enhancement)
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime,
}

impl LearningPathDoc {
    /// Create a new learning path document
    pub fn new(google_id: impl Into<String>, topic: impl Into<String>, nodes: Vec<ConceptNode>) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            google_id: google_id.into(),
            topic: topic.into(),
            nodes,
            created_at: now,
            last_updated: now,
        }
    }
}

impl IntoIndexes for LearningPathDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // At most one path per (user, topic)
            (
                doc! { "googleId": 1, "topic": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("google_id_topic_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_status_serializes_snake_case() {
        let json = serde_json::to_string(&NodeStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let json = serde_json::to_string(&NodeStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&NodeStatus::Mastered).unwrap();
        assert_eq!(json, "\"mastered\"");
    }

    #[test]
    fn concept_node_wire_field_names() {
        let node = ConceptNode::new("Motion");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["nodeText"], "Motion");
        assert_eq!(value["status"], "not_started");
        assert_eq!(value["priority"], 0);
        assert_eq!(value["recommendedResources"], serde_json::json!([]));
    }
}
