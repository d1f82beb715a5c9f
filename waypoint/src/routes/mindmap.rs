//! Mindmap routes
//!
//! - `POST /api/mindmap/generate` - generate (or return) the mermaid
//!   mindmap for a (user, topic)
//! - `GET /api/mindmap/{googleId}/{topic}` - fetch a mindmap
//! - `GET /api/user-mindmaps/{googleId}` - list a user's mindmaps
//! - `POST /api/get-node-info` - LLM explanation for one concept
//! - `POST /api/track-node-click` - record a node click, re-enrich
//! - `GET /api/clicked-nodes/{googleId}/{topic}` - click history
//! - `DELETE /api/delete-mindmap/{googleId}/{topic}` - cascade delete

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{ClickedNodeDoc, MindmapDoc};
use crate::error::{Result, WaypointError};
use crate::path::spawn_enhancement;
use crate::server::AppState;

use super::{json_response, path_params, read_json_body, respond};

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    topic: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    #[serde(rename = "mermaidCode")]
    mermaid_code: String,
    #[serde(rename = "isExisting", skip_serializing_if = "Option::is_none")]
    is_existing: Option<bool>,
    #[serde(rename = "isNew", skip_serializing_if = "Option::is_none")]
    is_new: Option<bool>,
}

#[derive(Deserialize)]
struct NodeInfoRequest {
    #[serde(rename = "nodeText")]
    node_text: String,
    #[serde(rename = "parentContext")]
    parent_context: String,
    #[serde(rename = "googleId")]
    google_id: String,
}

#[derive(Deserialize)]
struct TrackClickRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    topic: String,
    #[serde(rename = "nodeText")]
    node_text: String,
}

/// The three sections of a node explanation.
#[derive(Serialize, Debug, PartialEq)]
pub struct Explanation {
    #[serde(rename = "briefExplanation")]
    pub brief_explanation: String,
    pub example: String,
    #[serde(rename = "keyTakeaway")]
    pub key_takeaway: String,
}

/// Mindmap listing entry (topic and creation time only).
#[derive(Serialize)]
struct MindmapSummary {
    topic: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

/// Extract the mermaid source from a fenced model reply.
///
/// Returns the content of the first ```mermaid block, or the trimmed
/// reply when no such block exists.
pub fn clean_mermaid_code(text: &str) -> String {
    if let Some(start) = text.find("```mermaid") {
        let after = &text[start + "```mermaid".len()..];
        let after = after.strip_prefix('\n').unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }
    text.trim().to_string()
}

/// Split an explanation reply into its three sections by nonempty
/// lines; missing sections default to empty strings.
pub fn clean_explanation(explanation: &str) -> Explanation {
    let mut sections = explanation
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    Explanation {
        brief_explanation: sections.next().unwrap_or("").to_string(),
        example: sections.next().unwrap_or("").to_string(),
        key_takeaway: sections.next().unwrap_or("").to_string(),
    }
}

fn mindmap_prompt(topic: &str) -> String {
    format!(
        r#"Given the topic "{topic}", create a comprehensive Mermaid mindmap diagram that visualizes the complete knowledge structure.

Your mindmap should include:

1. A clear hierarchical structure with:
   - The main topic as the root node
   - Primary concepts as level 1 branches
   - Key subcategories as level 2 branches
   - Specific elements as level 3 branches
   - You can have more than 3 levels of depth for complex topics

2. Follow these structural guidelines:
   - Maintain logical grouping of related concepts
   - Ensure balanced branch distribution across the mindmap
   - Limit initial depth to 4 levels for clarity, but allow more depth for complex topics

3. Content requirements:
   - Include essential domain-specific terminology
   - Cover theoretical foundations and practical applications
   - Address interdisciplinary connections where appropriate

4. Formatting instructions:
   - Use precise, concise node labels (2-5 words maximum)
   - Maintain consistent terminology throughout
   - Use capitalization for main branches, sentence case for subnodes

Respond with ONLY the Mermaid mindmap code between triple backticks with 'mermaid' tag."#
    )
}

fn node_info_prompt(node_text: &str, parent_context: &str, hierarchy: Option<&str>) -> String {
    let context_suffix = hierarchy
        .map(|code| format!("\n\nHere is the complete mindmap hierarchy for context:\n{}", code))
        .unwrap_or_default();

    format!(
        r#"Given the concept "{node_text}" in the context of the topic "{parent_context}", provide:

1. A brief explanation (3-7 clear, informative sentences that define the concept precisely and highlight its importance)

2. One concrete example explained in simple terms that a 10-year-old would understand - use relatable scenarios, analogies, or everyday objects to make the concept tangible

3. Key takeaway that captures the essential insight or practical application of this concept in a memorable way

Keep each section concise (maximum 3 sentences each). Don't include section headings or numbers. Separate the three sections with a single line break. Use conversational language while maintaining accuracy. Avoid jargon unless absolutely necessary and explain any technical terms used.{context_suffix}"#
    )
}

/// Handle POST /api/mindmap/generate
pub async fn generate(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(generate_inner(req, state).await)
}

async fn generate_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: GenerateRequest = read_json_body(req).await?;
    let filter = doc! { "googleId": &body.google_id, "topic": &body.topic };

    if let Some(existing) = state.mindmaps.find_one(filter).await? {
        return Ok(json_response(
            StatusCode::OK,
            &GenerateResponse {
                mermaid_code: existing.mermaid_code,
                is_existing: Some(true),
                is_new: None,
            },
        ));
    }

    let reply = state.llm.complete(&mindmap_prompt(&body.topic)).await?;
    let cleaned = clean_mermaid_code(&reply);

    info!(
        "Generated mindmap for user {} topic '{}' ({} bytes)",
        body.google_id,
        body.topic,
        cleaned.len()
    );

    let mindmap = MindmapDoc::new(&body.google_id, &body.topic, &cleaned);
    state.mindmaps.insert_one(&mindmap).await?;

    Ok(json_response(
        StatusCode::OK,
        &GenerateResponse {
            mermaid_code: cleaned,
            is_existing: None,
            is_new: Some(true),
        },
    ))
}

/// Handle GET /api/mindmap/{googleId}/{topic}
pub async fn get_by_topic(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_by_topic_inner(path, state).await)
}

async fn get_by_topic_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, topic]) = path_params::<2>(path, "/api/mindmap/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/mindmap/{googleId}/{topic}".to_string(),
        ));
    };

    let filter = doc! { "googleId": &google_id, "topic": &topic };
    let Some(mindmap) = state.mindmaps.find_one(filter).await? else {
        return Err(WaypointError::NotFound("Mindmap"));
    };

    Ok(json_response(StatusCode::OK, &mindmap))
}

/// Handle GET /api/user-mindmaps/{googleId}
pub async fn get_user_mindmaps(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_user_mindmaps_inner(path, state).await)
}

async fn get_user_mindmaps_inner(
    path: &str,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let Some([google_id]) = path_params::<1>(path, "/api/user-mindmaps/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/user-mindmaps/{googleId}".to_string(),
        ));
    };

    let mindmaps = state
        .mindmaps
        .find_many_sorted(doc! { "googleId": &google_id }, Some(doc! { "createdAt": -1 }))
        .await?;

    let summaries: Vec<MindmapSummary> = mindmaps
        .into_iter()
        .map(|m| MindmapSummary {
            topic: m.topic,
            created_at: m.created_at,
        })
        .collect();

    Ok(json_response(StatusCode::OK, &summaries))
}

/// Handle POST /api/get-node-info
///
/// Builds an explanation prompt (embedding the stored mermaid source
/// when the topic's mindmap exists), splits the reply into the three
/// explanation sections, and records today's activity.
pub async fn get_node_info(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_node_info_inner(req, state).await)
}

async fn get_node_info_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: NodeInfoRequest = read_json_body(req).await?;

    // Fetch the complete mindmap for better context; proceed without it
    // when the topic has none.
    let filter = doc! { "googleId": &body.google_id, "topic": &body.parent_context };
    let mindmap = state.mindmaps.find_one(filter).await?;

    let prompt = node_info_prompt(
        &body.node_text,
        &body.parent_context,
        mindmap.as_ref().map(|m| m.mermaid_code.as_str()),
    );

    let reply = state.llm.complete(&prompt).await?;
    let explanation = clean_explanation(&reply);

    state.track_activity(&body.google_id).await?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "explanation": explanation }),
    ))
}

/// Handle POST /api/track-node-click
///
/// Appends the click record, records today's activity, and if the
/// topic has a learning path, re-runs enrichment in the background
/// with the full click history.
pub async fn track_node_click(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    respond(track_node_click_inner(req, state).await)
}

async fn track_node_click_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: TrackClickRequest = read_json_body(req).await?;

    let click = ClickedNodeDoc::new(&body.google_id, &body.topic, &body.node_text);
    state.clicked_nodes.insert_one(&click).await?;

    state.track_activity(&body.google_id).await?;

    let filter = doc! { "googleId": &body.google_id, "topic": &body.topic };
    if state.learning_paths.find_one(filter).await?.is_some() {
        spawn_enhancement(Arc::clone(&state), body.google_id, body.topic);
    }

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "success": true }),
    ))
}

/// Handle GET /api/clicked-nodes/{googleId}/{topic}
pub async fn get_clicked_nodes(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_clicked_nodes_inner(path, state).await)
}

async fn get_clicked_nodes_inner(
    path: &str,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, topic]) = path_params::<2>(path, "/api/clicked-nodes/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/clicked-nodes/{googleId}/{topic}".to_string(),
        ));
    };

    let clicks = state
        .clicked_nodes
        .find_many(doc! { "googleId": &google_id, "topic": &topic })
        .await?;

    Ok(json_response(StatusCode::OK, &clicks))
}

/// Handle DELETE /api/delete-mindmap/{googleId}/{topic}
///
/// Cascade: the mindmap, its learning path, all clicked nodes, and all
/// quizzes for the (user, topic) key are removed together.
pub async fn delete_mindmap(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(delete_mindmap_inner(path, state).await)
}

async fn delete_mindmap_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, topic]) = path_params::<2>(path, "/api/delete-mindmap/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/delete-mindmap/{googleId}/{topic}".to_string(),
        ));
    };

    let filter = doc! { "googleId": &google_id, "topic": &topic };

    state.mindmaps.delete_one(filter.clone()).await?;
    state.learning_paths.delete_one(filter.clone()).await?;
    state.clicked_nodes.delete_many(filter.clone()).await?;
    state.quizzes.delete_many(filter).await?;

    info!(
        "Deleted mindmap and related data for user {} topic '{}'",
        google_id, topic
    );

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "success": true }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mermaid_fence_extraction() {
        let reply = "Here you go:\n```mermaid\nmindmap\n  root((Physics))\n```\nEnjoy!";
        assert_eq!(clean_mermaid_code(reply), "mindmap\n  root((Physics))");
    }

    #[test]
    fn unfenced_reply_is_trimmed() {
        assert_eq!(
            clean_mermaid_code("  mindmap\n  root((Physics))  "),
            "mindmap\n  root((Physics))"
        );
    }

    #[test]
    fn unterminated_fence_falls_back_to_trim() {
        let reply = "```mermaid\nmindmap\n  root((Physics))";
        assert_eq!(clean_mermaid_code(reply), reply.trim());
    }

    #[test]
    fn explanation_splits_into_three_sections() {
        let reply = "Motion is change in position.\n\nA ball rolling downhill.\n\nEverything moves relative to something.";
        let explanation = clean_explanation(reply);
        assert_eq!(explanation.brief_explanation, "Motion is change in position.");
        assert_eq!(explanation.example, "A ball rolling downhill.");
        assert_eq!(
            explanation.key_takeaway,
            "Everything moves relative to something."
        );
    }

    #[test]
    fn missing_explanation_sections_default_to_empty() {
        let explanation = clean_explanation("Only one section.");
        assert_eq!(explanation.brief_explanation, "Only one section.");
        assert_eq!(explanation.example, "");
        assert_eq!(explanation.key_takeaway, "");
    }
}
