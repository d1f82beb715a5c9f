//! LLM enrichment of learning paths.
//!
//! Enhancement asks the completion API for a priority and resource list
//! per concept, then merges the reply onto the stored node list. The
//! model output is untrusted text: it is fence-stripped, then strictly
//! parsed, and any failure (network, timeout, malformed JSON) routes to
//! a deterministic fallback so every node always ends up with a usable
//! priority and resource list.
//!
//! Enhancement runs as a fire-and-forget task after the triggering
//! request has already answered: clients see placeholder values
//! (priority 0, no resources) until a re-fetch observes the enriched
//! path. Concurrent enhancements for the same (user, topic) are
//! last-write-wins, same as concurrent status updates.

use bson::doc;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use waypoint_llm::LlmClient;

use crate::db::schemas::ConceptNode;
use crate::error::{Result, WaypointError};
use crate::server::AppState;

/// Parsed shape of the model's enhancement reply.
#[derive(Debug, Deserialize)]
pub struct EnhancedNodes {
    pub nodes: Vec<EnhancedNode>,
}

/// One per-concept suggestion from the model.
#[derive(Debug, Deserialize)]
pub struct EnhancedNode {
    #[serde(rename = "nodeText")]
    pub node_text: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(rename = "recommendedResources", default)]
    pub recommended_resources: Vec<String>,
}

/// Build the enhancement instruction for a topic's concept list.
///
/// `explored` is rendered as the literal marker `none` when empty.
pub fn build_enhancement_prompt(topic: &str, labels: &[String], explored: &[String]) -> String {
    let explored_list = if explored.is_empty() {
        "none".to_string()
    } else {
        explored.join(", ")
    };

    format!(
        r#"Given a topic "{topic}" with the following concepts:
{concepts}

The user has already explored these concepts: {explored_list}

For each concept, provide:
1. A priority score (1-10) based on importance and logical learning order
2. 2-3 specific learning resources (articles, videos, or exercises)

Format your response as a valid JSON object like this:
{{
  "nodes": [
    {{
      "nodeText": "concept name",
      "priority": priority_score,
      "recommendedResources": ["resource1", "resource2"]
    }}
  ]
}}

Do not include any markdown formatting, code blocks, or backticks in your response. Just return the raw JSON."#,
        concepts = labels.join(", "),
    )
}

/// Strip markdown code fences from a model reply.
///
/// Models sometimes ignore the no-markdown instruction and wrap the
/// JSON in ```json ... ``` anyway.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Merge model suggestions onto the node list.
///
/// Matching is case-insensitive exact on label, first match wins;
/// suggestions for unknown labels are dropped (the model may invent
/// concepts). Matched nodes get priority and resources replaced
/// wholesale; unmatched nodes keep their prior values.
pub fn apply_enhancements(nodes: &mut [ConceptNode], enhanced: &EnhancedNodes) {
    for suggestion in &enhanced.nodes {
        let matched = nodes
            .iter_mut()
            .find(|n| n.node_text.eq_ignore_ascii_case(&suggestion.node_text));

        if let Some(node) = matched {
            node.priority = suggestion.priority;
            node.recommended_resources = suggestion.recommended_resources.clone();
        }
    }
}

/// Deterministic placeholder enrichment.
///
/// Priorities descend by document position, floored at 1; nodes with no
/// resources get exactly two synthesized suggestions. Total: always
/// leaves every node with a non-zero priority and non-empty resources.
pub fn fallback_enrichment(nodes: &mut [ConceptNode], topic: &str) {
    for (index, node) in nodes.iter_mut().enumerate() {
        node.priority = 10 - index.min(9) as i32;
        if node.recommended_resources.is_empty() {
            node.recommended_resources = vec![
                format!("{} {} tutorial", topic, node.node_text),
                format!("Learn {} basics", node.node_text),
            ];
        }
    }
}

/// Run one enhancement pass over a node list.
///
/// A single completion call; any failure (request error, timeout,
/// non-JSON reply) degrades to `fallback_enrichment`. An empty node
/// list is accepted and returned as-is after the round trip.
pub async fn enhance_nodes(
    mut nodes: Vec<ConceptNode>,
    explored: &[String],
    topic: &str,
    llm: &dyn LlmClient,
) -> Vec<ConceptNode> {
    let labels: Vec<String> = nodes.iter().map(|n| n.node_text.clone()).collect();
    let prompt = build_enhancement_prompt(topic, &labels, explored);

    match llm.complete(&prompt).await {
        Ok(raw) => {
            let cleaned = strip_code_fences(&raw);
            match serde_json::from_str::<EnhancedNodes>(&cleaned) {
                Ok(enhanced) => {
                    info!(
                        "Applying {} model suggestions to {} nodes for topic '{}'",
                        enhanced.nodes.len(),
                        nodes.len(),
                        topic
                    );
                    apply_enhancements(&mut nodes, &enhanced);
                }
                Err(e) => {
                    warn!(
                        "Model reply for topic '{}' was not valid JSON ({}); using fallback enrichment",
                        topic, e
                    );
                    fallback_enrichment(&mut nodes, topic);
                }
            }
        }
        Err(e) => {
            warn!(
                "Completion failed for topic '{}' ({}); using fallback enrichment",
                topic, e
            );
            fallback_enrichment(&mut nodes, topic);
        }
    }

    nodes
}

/// Load, enhance, and persist the learning path for (user, topic).
///
/// The stored node list is replaced wholesale and `lastUpdated`
/// stamped. Missing paths are not an error: the task just logs and
/// returns (the path may have been deleted under us).
pub async fn run_enhancement(state: &AppState, google_id: &str, topic: &str) -> Result<()> {
    let filter = doc! { "googleId": google_id, "topic": topic };

    let Some(path) = state.learning_paths.find_one(filter.clone()).await? else {
        warn!(
            "No learning path for user {} topic '{}', skipping enhancement",
            google_id, topic
        );
        return Ok(());
    };

    let explored = state.clicked_labels(google_id, topic).await?;
    let nodes = enhance_nodes(path.nodes, &explored, topic, state.llm.as_ref()).await;

    save_nodes(state, google_id, topic, &nodes).await
}

/// Persist a node list back onto the stored path.
async fn save_nodes(
    state: &AppState,
    google_id: &str,
    topic: &str,
    nodes: &[ConceptNode],
) -> Result<()> {
    let nodes_bson = bson::to_bson(nodes)
        .map_err(|e| WaypointError::Database(format!("Serialize failed: {}", e)))?;

    state
        .learning_paths
        .update_one(
            doc! { "googleId": google_id, "topic": topic },
            doc! { "$set": { "nodes": nodes_bson, "lastUpdated": bson::DateTime::now() } },
        )
        .await?;

    Ok(())
}

/// Secondary fallback: apply placeholder enrichment and try one
/// best-effort save. Used when `run_enhancement` itself failed.
async fn save_fallback_enrichment(state: &AppState, google_id: &str, topic: &str) -> Result<()> {
    let filter = doc! { "googleId": google_id, "topic": topic };

    let Some(path) = state.learning_paths.find_one(filter).await? else {
        return Ok(());
    };

    let mut nodes = path.nodes;
    fallback_enrichment(&mut nodes, topic);
    save_nodes(state, google_id, topic, &nodes).await
}

/// Spawn enhancement as a fire-and-forget background task.
///
/// The triggering handler returns before this completes; the returned
/// handle exists so tests can await completion. Failures never
/// propagate — worst case they are logged after the secondary fallback
/// also fails.
pub fn spawn_enhancement(state: Arc<AppState>, google_id: String, topic: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = run_enhancement(&state, &google_id, &topic).await {
            warn!(
                "Enhancement failed for user {} topic '{}': {}; attempting fallback save",
                google_id, topic, e
            );
            if let Err(e) = save_fallback_enrichment(&state, &google_id, &topic).await {
                error!(
                    "Fallback enrichment save failed for user {} topic '{}': {}",
                    google_id, topic, e
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_llm::MockLlm;

    fn nodes(labels: &[&str]) -> Vec<ConceptNode> {
        labels.iter().copied().map(ConceptNode::new).collect()
    }

    fn reply(entries: &[(&str, i32, &[&str])]) -> String {
        let nodes: Vec<serde_json::Value> = entries
            .iter()
            .map(|(label, priority, resources)| {
                serde_json::json!({
                    "nodeText": label,
                    "priority": priority,
                    "recommendedResources": resources,
                })
            })
            .collect();
        serde_json::json!({ "nodes": nodes }).to_string()
    }

    #[test]
    fn prompt_embeds_topic_concepts_and_explored() {
        let prompt = build_enhancement_prompt(
            "Physics",
            &["Motion".into(), "Energy".into()],
            &["Motion".into()],
        );
        assert!(prompt.contains("\"Physics\""));
        assert!(prompt.contains("Motion, Energy"));
        assert!(prompt.contains("already explored these concepts: Motion"));
    }

    #[test]
    fn prompt_marks_empty_exploration_as_none() {
        let prompt = build_enhancement_prompt("Physics", &["Motion".into()], &[]);
        assert!(prompt.contains("already explored these concepts: none"));
    }

    #[test]
    fn strips_tagged_and_bare_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn full_coverage_replaces_all_values_case_insensitively() {
        let llm = MockLlm::new(reply(&[
            ("motion", 7, &["Kinematics video"]),
            ("ENERGY", 3, &["Energy article", "Energy quiz"]),
        ]));

        let result = enhance_nodes(nodes(&["Motion", "Energy"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 7);
        assert_eq!(result[0].recommended_resources, vec!["Kinematics video"]);
        assert_eq!(result[1].priority, 3);
        assert_eq!(
            result[1].recommended_resources,
            vec!["Energy article", "Energy quiz"]
        );
    }

    #[tokio::test]
    async fn partial_coverage_leaves_unmatched_nodes_untouched() {
        let llm = MockLlm::new(reply(&[("Motion", 9, &["Intro video"])]));

        let result = enhance_nodes(nodes(&["Motion", "Energy"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 9);
        assert_eq!(result[1].priority, 0);
        assert!(result[1].recommended_resources.is_empty());
    }

    #[tokio::test]
    async fn invented_concepts_are_dropped() {
        let llm = MockLlm::new(reply(&[
            ("Motion", 9, &["Intro video"]),
            ("Quantum Chromodynamics", 10, &["Way off"]),
        ]));

        let result = enhance_nodes(nodes(&["Motion"]), &[], "Physics", &llm).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].priority, 9);
    }

    #[tokio::test]
    async fn duplicate_labels_collapse_onto_first_match() {
        // Known limitation: labels differing only in case are
        // indistinguishable to the merge, so the second never receives
        // model data.
        let llm = MockLlm::new(reply(&[("energy", 5, &["resource"])]));

        let result = enhance_nodes(nodes(&["Energy", "ENERGY"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 5);
        assert_eq!(result[1].priority, 0);
    }

    #[tokio::test]
    async fn failing_llm_routes_to_fallback() {
        let llm = MockLlm::failing("connection refused");

        let result = enhance_nodes(nodes(&["Motion"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 10);
        assert_eq!(
            result[0].recommended_resources,
            vec!["Physics Motion tutorial", "Learn Motion basics"]
        );
    }

    #[tokio::test]
    async fn non_json_reply_routes_to_fallback() {
        let llm = MockLlm::new("Sure! Here are my suggestions: Motion is important.");

        let result = enhance_nodes(nodes(&["Motion", "Energy"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 10);
        assert_eq!(result[1].priority, 9);
    }

    #[tokio::test]
    async fn fence_wrapped_json_still_parses() {
        let llm = MockLlm::new(format!(
            "```json\n{}\n```",
            reply(&[("Motion", 6, &["resource"])])
        ));

        let result = enhance_nodes(nodes(&["Motion"]), &[], "Physics", &llm).await;

        assert_eq!(result[0].priority, 6);
    }

    #[tokio::test]
    async fn idempotent_for_a_fixed_reply() {
        let reply_text = reply(&[("Motion", 4, &["resource"])]);

        let first = enhance_nodes(
            nodes(&["Motion"]),
            &[],
            "Physics",
            &MockLlm::new(reply_text.clone()),
        )
        .await;
        let second = enhance_nodes(first.clone(), &[], "Physics", &MockLlm::new(reply_text)).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_concept_list_passes_through() {
        let llm = MockLlm::new(reply(&[("Anything", 5, &["resource"])]));

        let result = enhance_nodes(Vec::new(), &[], "Physics", &llm).await;

        assert!(result.is_empty());
        assert_eq!(llm.call_count(), 1);
    }

    #[test]
    fn fallback_priorities_floor_at_one() {
        let mut many: Vec<ConceptNode> = (0..12)
            .map(|i| ConceptNode::new(format!("Concept {}", i)))
            .collect();
        fallback_enrichment(&mut many, "Physics");

        assert_eq!(many[0].priority, 10);
        assert_eq!(many[9].priority, 1);
        assert_eq!(many[10].priority, 1);
        assert_eq!(many[11].priority, 1);
    }

    #[test]
    fn fallback_keeps_existing_resources() {
        let mut list = nodes(&["Motion"]);
        list[0].recommended_resources = vec!["Hand-picked article".to_string()];
        fallback_enrichment(&mut list, "Physics");

        assert_eq!(list[0].priority, 10);
        assert_eq!(list[0].recommended_resources, vec!["Hand-picked article"]);
    }
}
