//! Quiz document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for quizzes
pub const QUIZ_COLLECTION: &str = "quizzes";

/// One multiple-choice question.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuizQuestion {
    /// Question text
    pub question: String,

    /// Answer options (one correct)
    pub options: Vec<String>,

    /// Index of the correct option
    #[serde(rename = "correctAnswer")]
    pub correct_answer: i32,

    /// Why the correct answer is correct
    pub explanation: String,
}

/// Quiz document stored in MongoDB, one per (user, topic, node)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuizDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Mindmap topic
    pub topic: String,

    /// Concept label the quiz covers
    #[serde(rename = "nodeText")]
    pub node_text: String,

    /// Questions
    pub questions: Vec<QuizQuestion>,

    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl QuizDoc {
    /// Create a new quiz document
    pub fn new(
        google_id: impl Into<String>,
        topic: impl Into<String>,
        node_text: impl Into<String>,
        questions: Vec<QuizQuestion>,
    ) -> Self {
        Self {
            id: None,
            google_id: google_id.into(),
            topic: topic.into(),
            node_text: node_text.into(),
            questions,
            created_at: DateTime::now(),
        }
    }
}

impl IntoIndexes for QuizDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "googleId": 1, "topic": 1, "nodeText": 1 },
            Some(
                IndexOptions::builder()
                    .name("google_id_topic_node_index".to_string())
                    .build(),
            ),
        )]
    }
}
