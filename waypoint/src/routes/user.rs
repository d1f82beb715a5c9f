//! User routes
//!
//! - `POST /api/user/check-user` - does a profile exist
//! - `POST /api/user/register` - create a profile
//! - `GET /api/user/profile/{googleId}` - fetch a profile
//! - `PUT /api/user/profile/{googleId}` - update username/picture
//! - `GET /api/user/activity/{googleId}/{month}/{year}` - calendar data
//! - `POST /api/user/track-activity` - record today's activity
//! - `GET /api/user/stats/{googleId}` - totals and current streak

use bson::doc;
use bytes::Bytes;
use chrono::{Duration, Utc};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::schemas::UserDoc;
use crate::error::{Result, WaypointError};
use crate::server::{utc_midnight, AppState};

use super::{json_response, path_params, read_json_body, respond};

#[derive(Deserialize)]
struct CheckUserRequest {
    #[serde(rename = "googleId")]
    google_id: String,
}

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(rename = "googleId")]
    google_id: String,
    email: String,
    username: String,
    picture: Option<String>,
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    username: Option<String>,
    picture: Option<String>,
}

#[derive(Deserialize)]
struct TrackActivityRequest {
    #[serde(rename = "googleId")]
    google_id: String,
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(rename = "totalActivityDays")]
    total_activity_days: u64,
    #[serde(rename = "totalMindmaps")]
    total_mindmaps: u64,
    #[serde(rename = "currentStreak")]
    current_streak: u32,
}

/// Handle POST /api/user/check-user
pub async fn check_user(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(check_user_inner(req, state).await)
}

async fn check_user_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: CheckUserRequest = read_json_body(req).await?;

    let user = state
        .users
        .find_one(doc! { "googleId": &body.google_id })
        .await?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "exists": user.is_some(), "user": user }),
    ))
}

/// Handle POST /api/user/register
pub async fn register(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(register_inner(req, state).await)
}

async fn register_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: RegisterRequest = read_json_body(req).await?;

    let existing = state
        .users
        .find_one(doc! { "username": &body.username })
        .await?;
    if existing.is_some() {
        return Err(WaypointError::InvalidRequest(
            "Username already taken".to_string(),
        ));
    }

    let user = UserDoc::new(&body.google_id, &body.email, &body.username, body.picture);
    state.users.insert_one(&user).await?;

    Ok(json_response(StatusCode::CREATED, &user))
}

/// Handle GET /api/user/profile/{googleId}
pub async fn get_profile(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_profile_inner(path, state).await)
}

async fn get_profile_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id]) = path_params::<1>(path, "/api/user/profile/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/user/profile/{googleId}".to_string(),
        ));
    };

    let Some(user) = state.users.find_one(doc! { "googleId": &google_id }).await? else {
        return Err(WaypointError::NotFound("User"));
    };

    Ok(json_response(StatusCode::OK, &user))
}

/// Handle PUT /api/user/profile/{googleId}
pub async fn update_profile(
    path: &str,
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    respond(update_profile_inner(path, req, state).await)
}

async fn update_profile_inner(
    path: &str,
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let Some([google_id]) = path_params::<1>(path, "/api/user/profile/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/user/profile/{googleId}".to_string(),
        ));
    };
    let body: UpdateProfileRequest = read_json_body(req).await?;

    // A username move must not collide with another user's name
    if let Some(username) = &body.username {
        let taken = state
            .users
            .find_one(doc! { "username": username, "googleId": { "$ne": &google_id } })
            .await?;
        if taken.is_some() {
            return Err(WaypointError::InvalidRequest(
                "Username already taken".to_string(),
            ));
        }
    }

    let mut set = bson::Document::new();
    if let Some(username) = &body.username {
        set.insert("username", username);
    }
    if let Some(picture) = &body.picture {
        set.insert("picture", picture);
    }
    if !set.is_empty() {
        state
            .users
            .update_one(doc! { "googleId": &google_id }, doc! { "$set": set })
            .await?;
    }

    let Some(user) = state.users.find_one(doc! { "googleId": &google_id }).await? else {
        return Err(WaypointError::NotFound("User"));
    };

    Ok(json_response(StatusCode::OK, &user))
}

/// Handle GET /api/user/activity/{googleId}/{month}/{year}
pub async fn get_activity(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_activity_inner(path, state).await)
}

async fn get_activity_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id, month, year]) = path_params::<3>(path, "/api/user/activity/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/user/activity/{googleId}/{month}/{year}".to_string(),
        ));
    };

    let month: u32 = month
        .parse()
        .map_err(|_| WaypointError::InvalidRequest("Invalid month".to_string()))?;
    let year: i32 = year
        .parse()
        .map_err(|_| WaypointError::InvalidRequest("Invalid year".to_string()))?;

    let start = chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| WaypointError::InvalidRequest("Invalid month".to_string()))?;
    let end = if month == 12 {
        chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| WaypointError::InvalidRequest("Invalid month".to_string()))?;

    let start = bson::DateTime::from_chrono(start.and_time(chrono::NaiveTime::MIN).and_utc());
    let end = bson::DateTime::from_chrono(end.and_time(chrono::NaiveTime::MIN).and_utc());

    let activities = state
        .activity
        .find_many(doc! {
            "googleId": &google_id,
            "date": { "$gte": start, "$lt": end },
        })
        .await?;

    let dates: Vec<serde_json::Value> = activities
        .iter()
        .map(|a| serde_json::json!({ "date": a.date.try_to_rfc3339_string().unwrap_or_default() }))
        .collect();

    Ok(json_response(StatusCode::OK, &dates))
}

/// Handle POST /api/user/track-activity
pub async fn track_activity(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(track_activity_inner(req, state).await)
}

async fn track_activity_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: TrackActivityRequest = read_json_body(req).await?;
    state.track_activity(&body.google_id).await?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "success": true }),
    ))
}

/// Handle GET /api/user/stats/{googleId}
///
/// The current streak walks back from today one day at a time until a
/// day with no activity record.
pub async fn get_stats(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(get_stats_inner(path, state).await)
}

async fn get_stats_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([google_id]) = path_params::<1>(path, "/api/user/stats/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/user/stats/{googleId}".to_string(),
        ));
    };

    let total_activity_days = state.activity.count(doc! { "googleId": &google_id }).await?;
    let total_mindmaps = state.mindmaps.count(doc! { "googleId": &google_id }).await?;

    let mut current_streak: u32 = 0;
    let mut check_day = Utc::now();
    loop {
        let day = utc_midnight(check_day);
        let activity = state
            .activity
            .find_one(doc! { "googleId": &google_id, "date": day })
            .await?;
        if activity.is_none() {
            break;
        }
        current_streak += 1;
        check_day -= Duration::days(1);
    }

    Ok(json_response(
        StatusCode::OK,
        &StatsResponse {
            total_activity_days,
            total_mindmaps,
            current_streak,
        },
    ))
}
