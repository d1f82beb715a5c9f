//! Quiz routes
//!
//! - `POST /api/quiz/generate` - generate (or return) a quiz for a
//!   (user, topic, node); malformed model output degrades to a
//!   deterministic single-question fallback quiz
//! - `GET /api/quiz/{googleId}/{topic}/{nodeText}` - fetch a quiz

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::schemas::{QuizDoc, QuizQuestion};
use crate::error::{Result, WaypointError};
use crate::path::strip_code_fences;
use crate::server::AppState;

use super::{json_response, path_params, read_json_body, respond};

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    topic: String,
    #[serde(rename = "nodeText")]
    node_text: String,
    #[serde(rename = "parentContext")]
    parent_context: Option<String>,
    #[serde(rename = "forceRefresh", default)]
    force_refresh: bool,
}

/// Parsed shape of the model's quiz reply.
#[derive(Deserialize)]
struct QuizReply {
    questions: Vec<QuizQuestion>,
}

fn quiz_prompt(node_text: &str, context: &str, explored: &[String]) -> String {
    let explored_list = if explored.is_empty() {
        "none".to_string()
    } else {
        explored.join(", ")
    };

    format!(
        r#"Create a quiz about "{node_text}" in the context of "{context}".

The user has already explored these concepts: {explored_list}

Generate 5-10 multiple-choice questions that test understanding of key concepts.

For each question:
1. Write a clear question
2. Provide 4 options (only one correct)
3. Indicate which option is correct (0-3)
4. Include a brief explanation of why the answer is correct

Format your response as a valid JSON object:
{{
  "questions": [
    {{
      "question": "Question text",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "correctAnswer": correct_option_index,
      "explanation": "Explanation text"
    }}
  ]
}}

Do not include any markdown formatting, code blocks, or backticks in your response. Just return the raw JSON."#
    )
}

/// Deterministic single-question quiz used when the model reply is
/// unusable.
pub fn fallback_questions(node_text: &str, topic: &str) -> Vec<QuizQuestion> {
    vec![QuizQuestion {
        question: format!("What is the main concept of {}?", node_text),
        options: vec![
            format!("{} is a fundamental concept in {}", node_text, topic),
            format!("{} is unrelated to {}", node_text, topic),
            format!("{} is a fictional term", node_text),
            format!("{} is only used in advanced applications", node_text),
        ],
        correct_answer: 0,
        explanation: format!("{} is indeed a fundamental concept in {}.", node_text, topic),
    }]
}

/// Handle POST /api/quiz/generate
pub async fn generate(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(generate_inner(req, state).await)
}

async fn generate_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: GenerateRequest = read_json_body(req).await?;
    let filter = doc! {
        "googleId": &body.google_id,
        "topic": &body.topic,
        "nodeText": &body.node_text,
    };

    if body.force_refresh {
        state.quizzes.delete_one(filter.clone()).await?;
    } else if let Some(quiz) = state.quizzes.find_one(filter.clone()).await? {
        return Ok(json_response(StatusCode::OK, &quiz));
    }

    let explored = state.clicked_labels(&body.google_id, &body.topic).await?;
    let context = body.parent_context.as_deref().unwrap_or(&body.topic);
    let prompt = quiz_prompt(&body.node_text, context, &explored);

    let reply = state.llm.complete(&prompt).await?;
    let cleaned = strip_code_fences(&reply);

    let questions = match serde_json::from_str::<QuizReply>(&cleaned) {
        Ok(parsed) => {
            info!(
                "Generated {} quiz questions for node '{}' in topic '{}'",
                parsed.questions.len(),
                body.node_text,
                body.topic
            );
            parsed.questions
        }
        Err(e) => {
            warn!(
                "Quiz reply for node '{}' was not valid JSON ({}); using fallback quiz",
                body.node_text, e
            );
            fallback_questions(&body.node_text, &body.topic)
        }
    };

    let quiz = QuizDoc::new(&body.google_id, &body.topic, &body.node_text, questions);
    state.quizzes.insert_one(&quiz).await?;

    Ok(json_response(StatusCode::OK, &quiz))
}

/// Handle GET /api/quiz/{googleId}/{topic}/{nodeText}
pub async fn get(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_inner(path, state).await)
}

async fn get_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, topic, node_text]) = path_params::<3>(path, "/api/quiz/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/quiz/{googleId}/{topic}/{nodeText}".to_string(),
        ));
    };

    let filter = doc! {
        "googleId": &google_id,
        "topic": &topic,
        "nodeText": &node_text,
    };
    let Some(quiz) = state.quizzes.find_one(filter).await? else {
        return Err(WaypointError::NotFound("Quiz"));
    };

    Ok(json_response(StatusCode::OK, &quiz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_quiz_is_one_question_with_first_option_correct() {
        let questions = fallback_questions("Photosynthesis", "Biology");

        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.correct_answer, 0);
        assert_eq!(q.options.len(), 4);
        assert!(q.question.contains("Photosynthesis"));
        assert!(q.options[0].contains("Biology"));
        assert!(q.explanation.contains("fundamental concept"));
    }

    #[test]
    fn quiz_reply_parses_wire_field_names() {
        let reply = r#"{"questions":[{"question":"Q?","options":["a","b","c","d"],"correctAnswer":2,"explanation":"because"}]}"#;
        let parsed: QuizReply = serde_json::from_str(reply).unwrap();
        assert_eq!(parsed.questions[0].correct_answer, 2);
    }

    #[test]
    fn quiz_prompt_marks_empty_exploration_as_none() {
        let prompt = quiz_prompt("Motion", "Physics", &[]);
        assert!(prompt.contains("already explored these concepts: none"));
    }
}
