//! Learning path routes
//!
//! - `POST /api/learning-path/generate` - create (or return) the path
//!   for a (user, topic), then enrich it in the background
//! - `POST /api/learning-path/update-status` - set one node's status
//! - `GET /api/learning-path/{googleId}/{topic}` - fetch a path

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{ConceptNode, LearningPathDoc, NodeStatus};
use crate::error::{Result, WaypointError};
use crate::path::{extract_concepts, spawn_enhancement};
use crate::server::AppState;

use super::{json_response, path_params, read_json_body, respond};

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    topic: String,
}

#[derive(Deserialize)]
struct UpdateStatusRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    topic: String,
    #[serde(rename = "nodeText")]
    node_text: String,
    status: NodeStatus,
}

/// Handle POST /api/learning-path/generate
///
/// Returns the existing path when one exists; otherwise extracts the
/// concept list from the stored mindmap, saves a provisional path
/// (priority 0, no resources), and spawns background enrichment. The
/// response is the provisional path - clients re-fetch to observe the
/// enriched values.
pub async fn generate(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(generate_inner(req, state).await)
}

async fn generate_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: GenerateRequest = read_json_body(req).await?;
    let filter = doc! { "googleId": &body.google_id, "topic": &body.topic };

    if let Some(existing) = state.learning_paths.find_one(filter.clone()).await? {
        return Ok(json_response(StatusCode::OK, &existing));
    }

    let Some(mindmap) = state.mindmaps.find_one(filter).await? else {
        return Err(WaypointError::NotFound("Mindmap"));
    };

    let nodes: Vec<ConceptNode> = extract_concepts(&mindmap.mermaid_code)
        .into_iter()
        .map(ConceptNode::new)
        .collect();

    info!(
        "Creating learning path for user {} topic '{}' with {} nodes",
        body.google_id,
        body.topic,
        nodes.len()
    );

    let path = LearningPathDoc::new(&body.google_id, &body.topic, nodes);
    state.learning_paths.insert_one(&path).await?;

    // Fire-and-forget: the client gets the provisional path now
    spawn_enhancement(Arc::clone(&state), body.google_id, body.topic);

    Ok(json_response(StatusCode::OK, &path))
}

/// Handle POST /api/learning-path/update-status
///
/// Exact (case-sensitive) label match; 404 when the path or the node
/// is missing.
pub async fn update_status(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(update_status_inner(req, state).await)
}

async fn update_status_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: UpdateStatusRequest = read_json_body(req).await?;
    let filter = doc! { "googleId": &body.google_id, "topic": &body.topic };

    let Some(mut path) = state.learning_paths.find_one(filter.clone()).await? else {
        return Err(WaypointError::NotFound("Learning path"));
    };

    let Some(node) = path.nodes.iter_mut().find(|n| n.node_text == body.node_text) else {
        return Err(WaypointError::NotFound("Node in learning path"));
    };
    node.status = body.status;
    path.last_updated = bson::DateTime::now();

    let nodes_bson = bson::to_bson(&path.nodes)
        .map_err(|e| WaypointError::Database(format!("Serialize failed: {}", e)))?;
    state
        .learning_paths
        .update_one(
            filter,
            doc! { "$set": { "nodes": nodes_bson, "lastUpdated": path.last_updated } },
        )
        .await?;

    Ok(json_response(StatusCode::OK, &path))
}

/// Handle GET /api/learning-path/{googleId}/{topic}
pub async fn get(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_inner(path, state).await)
}

async fn get_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, topic]) = path_params::<2>(path, "/api/learning-path/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/learning-path/{googleId}/{topic}".to_string(),
        ));
    };

    let filter = doc! { "googleId": &google_id, "topic": &topic };
    let Some(learning_path) = state.learning_paths.find_one(filter).await? else {
        return Err(WaypointError::NotFound("Learning path"));
    };

    Ok(json_response(StatusCode::OK, &learning_path))
}
