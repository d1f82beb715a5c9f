//! HTTP server
//!
//! hyper http1 with TokioIo, one spawned task per connection. All
//! routing happens in `handle_request` by matching (method, path).

use bytes::Bytes;
use chrono::{NaiveTime, Utc};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use bson::doc;
use waypoint_llm::LlmClient;

use crate::config::Args;
use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    ClickedNodeDoc, LearningPathDoc, MindmapDoc, QuizDoc, StreakRewardDoc, UserActivityDoc,
    UserDoc, CLICKED_NODE_COLLECTION, LEARNING_PATH_COLLECTION, MINDMAP_COLLECTION,
    QUIZ_COLLECTION, STREAK_REWARD_COLLECTION, USER_ACTIVITY_COLLECTION, USER_COLLECTION,
};
use crate::error::Result;
use crate::routes::{self, not_found_response, preflight_response};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub llm: Arc<dyn LlmClient>,
    pub mindmaps: MongoCollection<MindmapDoc>,
    pub learning_paths: MongoCollection<LearningPathDoc>,
    pub clicked_nodes: MongoCollection<ClickedNodeDoc>,
    pub quizzes: MongoCollection<QuizDoc>,
    pub users: MongoCollection<UserDoc>,
    pub activity: MongoCollection<UserActivityDoc>,
    pub streak_rewards: MongoCollection<StreakRewardDoc>,
}

impl AppState {
    /// Create application state with typed collections (indexes applied)
    pub async fn new(args: Args, mongo: &MongoClient, llm: Arc<dyn LlmClient>) -> Result<Self> {
        Ok(Self {
            args,
            llm,
            mindmaps: mongo.collection(MINDMAP_COLLECTION).await?,
            learning_paths: mongo.collection(LEARNING_PATH_COLLECTION).await?,
            clicked_nodes: mongo.collection(CLICKED_NODE_COLLECTION).await?,
            quizzes: mongo.collection(QUIZ_COLLECTION).await?,
            users: mongo.collection(USER_COLLECTION).await?,
            activity: mongo.collection(USER_ACTIVITY_COLLECTION).await?,
            streak_rewards: mongo.collection(STREAK_REWARD_COLLECTION).await?,
        })
    }

    /// Distinct clicked labels for (user, topic), in first-click order
    pub async fn clicked_labels(&self, google_id: &str, topic: &str) -> Result<Vec<String>> {
        let clicks = self
            .clicked_nodes
            .find_many(doc! { "googleId": google_id, "topic": topic })
            .await?;

        let mut seen = HashSet::new();
        Ok(clicks
            .into_iter()
            .map(|c| c.node_text)
            .filter(|label| seen.insert(label.clone()))
            .collect())
    }

    /// Upsert today's activity record for a user.
    ///
    /// Days are bucketed at midnight UTC so repeated activity within
    /// the same day stays a single document.
    pub async fn track_activity(&self, google_id: &str) -> Result<()> {
        let today = utc_midnight(Utc::now());

        self.activity
            .upsert_one(
                doc! { "googleId": google_id, "date": today },
                doc! { "$setOnInsert": { "googleId": google_id, "date": today } },
            )
            .await?;

        Ok(())
    }
}

/// Truncate a timestamp to midnight UTC as a BSON datetime
pub(crate) fn utc_midnight(dt: chrono::DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_chrono(dt.date_naive().and_time(NaiveTime::MIN).and_utc())
}

/// Run the HTTP server until the process is terminated
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Waypoint listening on {}", state.args.listen);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(),

        (Method::OPTIONS, _) => preflight_response(),

        // Learning paths
        (Method::POST, "/api/learning-path/generate") => {
            routes::learning_path::generate(req, state).await
        }
        (Method::POST, "/api/learning-path/update-status") => {
            routes::learning_path::update_status(req, state).await
        }
        (Method::GET, p) if p.starts_with("/api/learning-path/") => {
            routes::learning_path::get(p, state).await
        }

        // Mindmaps
        (Method::POST, "/api/mindmap/generate") => routes::mindmap::generate(req, state).await,
        (Method::POST, "/api/get-node-info") => routes::mindmap::get_node_info(req, state).await,
        (Method::POST, "/api/track-node-click") => {
            routes::mindmap::track_node_click(req, state).await
        }
        (Method::GET, p) if p.starts_with("/api/mindmap/") => {
            routes::mindmap::get_by_topic(p, state).await
        }
        (Method::GET, p) if p.starts_with("/api/user-mindmaps/") => {
            routes::mindmap::get_user_mindmaps(p, state).await
        }
        (Method::GET, p) if p.starts_with("/api/clicked-nodes/") => {
            routes::mindmap::get_clicked_nodes(p, state).await
        }
        (Method::DELETE, p) if p.starts_with("/api/delete-mindmap/") => {
            routes::mindmap::delete_mindmap(p, state).await
        }

        // Quizzes
        (Method::POST, "/api/quiz/generate") => routes::quiz::generate(req, state).await,
        (Method::GET, p) if p.starts_with("/api/quiz/") => routes::quiz::get(p, state).await,

        // Users
        (Method::POST, "/api/user/check-user") => routes::user::check_user(req, state).await,
        (Method::POST, "/api/user/register") => routes::user::register(req, state).await,
        (Method::POST, "/api/user/track-activity") => {
            routes::user::track_activity(req, state).await
        }
        (Method::GET, p) if p.starts_with("/api/user/profile/") => {
            routes::user::get_profile(p, state).await
        }
        (Method::PUT, p) if p.starts_with("/api/user/profile/") => {
            routes::user::update_profile(p, req, state).await
        }
        (Method::GET, p) if p.starts_with("/api/user/activity/") => {
            routes::user::get_activity(p, state).await
        }
        (Method::GET, p) if p.starts_with("/api/user/stats/") => {
            routes::user::get_stats(p, state).await
        }

        // Streak rewards
        (Method::GET, p) if p.starts_with("/api/streak/check/") => {
            routes::streak::check_eligibility(p, state).await
        }
        (Method::POST, "/api/streak/record-claim") => {
            routes::streak::record_claim(req, state).await
        }

        _ => not_found_response(&path),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_midnight_truncates_time_of_day() {
        let dt = chrono::NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(15, 9, 26)
            .unwrap()
            .and_utc();

        let midnight = utc_midnight(dt).to_chrono();
        assert_eq!(midnight.date_naive(), dt.date_naive());
        assert_eq!(midnight.time(), NaiveTime::MIN);
    }

    #[test]
    fn same_day_timestamps_share_a_bucket() {
        let d = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let morning = d.and_hms_opt(1, 0, 0).unwrap().and_utc();
        let evening = d.and_hms_opt(23, 59, 59).unwrap().and_utc();
        assert_eq!(utc_midnight(morning), utc_midnight(evening));
    }
}
