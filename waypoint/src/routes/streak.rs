//! Streak reward routes
//!
//! - `GET /api/streak/check/{walletAddress}` - eligibility: activity on
//!   each of the last 5 calendar days, and past any cooldown from a
//!   previous claim
//! - `POST /api/streak/record-claim` - record a claim; the next claim
//!   becomes possible 5 days later

use bson::doc;
use bytes::Bytes;
use chrono::{Duration, Utc};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, WaypointError};
use crate::server::{utc_midnight, AppState};

use super::{json_response, path_params, read_json_body, respond};

/// Days of consecutive activity required for a reward, and the cooldown
/// between claims.
pub const STREAK_DAYS: i64 = 5;

#[derive(Deserialize)]
struct RecordClaimRequest {
    #[serde(rename = "walletAddress")]
    wallet_address: String,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
}

/// Count the distinct calendar days (UTC) among activity timestamps.
///
/// Duplicate same-day records collapse onto one day.
pub fn unique_days(dates: &[bson::DateTime]) -> usize {
    dates
        .iter()
        .map(|d| d.to_chrono().date_naive())
        .collect::<HashSet<_>>()
        .len()
}

/// Handle GET /api/streak/check/{walletAddress}
pub async fn check_eligibility(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(check_eligibility_inner(path, state).await)
}

async fn check_eligibility_inner(path: &str, state: Arc<AppState>) -> Result<Response<Full<Bytes>>> {
    let Some([wallet_address]) = path_params::<1>(path, "/api/streak/check/") else {
        return Err(WaypointError::InvalidRequest(
            "Expected /api/streak/check/{walletAddress}".to_string(),
        ));
    };
    let wallet_address = wallet_address.to_lowercase();

    let now = Utc::now();
    // Window covers today and the 4 days before it
    let window_start = utc_midnight(now - Duration::days(STREAK_DAYS - 1));

    let activities = state
        .activity
        .find_many(doc! {
            "walletAddress": &wallet_address,
            "date": { "$gte": window_start, "$lte": bson::DateTime::from_chrono(now) },
        })
        .await?;

    let dates: Vec<bson::DateTime> = activities.iter().map(|a| a.date).collect();
    let current_streak = unique_days(&dates);

    let record = state
        .streak_rewards
        .find_one(doc! { "walletAddress": &wallet_address })
        .await?;

    let past_cooldown = record
        .as_ref()
        .map(|r| now >= r.next_eligible_date.to_chrono())
        .unwrap_or(true);
    let is_eligible = current_streak >= STREAK_DAYS as usize && past_cooldown;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({
            "isEligible": is_eligible,
            "nextEligibleDate": record
                .as_ref()
                .map(|r| r.next_eligible_date.try_to_rfc3339_string().unwrap_or_default()),
            "currentStreak": current_streak,
        }),
    ))
}

/// Handle POST /api/streak/record-claim
pub async fn record_claim(req: Request<Incoming>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    respond(record_claim_inner(req, state).await)
}

async fn record_claim_inner(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let body: RecordClaimRequest = read_json_body(req).await?;
    let wallet_address = body.wallet_address.to_lowercase();

    let now = Utc::now();
    let next_eligible = now + Duration::days(STREAK_DAYS);

    state
        .streak_rewards
        .upsert_one(
            doc! { "walletAddress": &wallet_address },
            doc! {
                "$set": {
                    "lastClaimDate": bson::DateTime::from_chrono(now),
                    "nextEligibleDate": bson::DateTime::from_chrono(next_eligible),
                    "lastTransactionHash": &body.transaction_hash,
                }
            },
        )
        .await?;

    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "success": true }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, h: u32) -> bson::DateTime {
        let dt = chrono::NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc();
        bson::DateTime::from_chrono(dt)
    }

    #[test]
    fn duplicate_same_day_activity_counts_once() {
        let dates = vec![day(2025, 3, 1, 0), day(2025, 3, 1, 14), day(2025, 3, 2, 0)];
        assert_eq!(unique_days(&dates), 2);
    }

    #[test]
    fn five_distinct_days_count_as_five() {
        let dates: Vec<_> = (1..=5).map(|d| day(2025, 3, d, 0)).collect();
        assert_eq!(unique_days(&dates), 5);
    }

    #[test]
    fn empty_activity_is_zero_days() {
        assert_eq!(unique_days(&[]), 0);
    }
}
