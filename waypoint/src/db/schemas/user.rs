//! User document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Google account identifier
    #[serde(rename = "googleId")]
    pub google_id: String,

    /// Email address
    pub email: String,

    /// Display name, unique across users
    pub username: String,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Registration timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl UserDoc {
    /// Create a new user document
    pub fn new(
        google_id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        picture: Option<String>,
    ) -> Self {
        Self {
            id: None,
            google_id: google_id.into(),
            email: email.into(),
            username: username.into(),
            picture,
            created_at: DateTime::now(),
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "username": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("username_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "googleId": 1 },
                Some(
                    IndexOptions::builder()
                        .name("google_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
