//! Daily cost, meal tracking, and settlement endpoints.

use crate::{
    core::{daily_cost, settlement, tracking},
    entities::{daily_meal_cost, meal_tracking},
    errors::{Error, Result},
    http::{AppState, auth::CurrentMember},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct DailyCostListQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct SetDailyCostRequest {
    date: NaiveDate,
    #[serde(default)]
    lunch_cost: f64,
    #[serde(default)]
    dinner_cost: f64,
    #[serde(default)]
    lunch_participants: i32,
    #[serde(default)]
    dinner_participants: i32,
}

#[derive(Debug, Deserialize)]
struct UpdateDailyCostRequest {
    #[serde(default)]
    lunch_cost: f64,
    #[serde(default)]
    dinner_cost: f64,
    #[serde(default)]
    lunch_participants: i32,
    #[serde(default)]
    dinner_participants: i32,
}

#[derive(Debug, Deserialize)]
struct TrackingListQuery {
    member_id: Option<i64>,
    date: Option<NaiveDate>,
    is_paid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RecordTrackingRequest {
    member_id: i64,
    date: NaiveDate,
    lunch_count: i32,
    dinner_count: i32,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateTrackingRequest {
    lunch_count: i32,
    dinner_count: i32,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkEntry {
    member_id: i64,
    lunch_count: i32,
    dinner_count: i32,
}

#[derive(Debug, Deserialize)]
struct BulkUpdateRequest {
    date: NaiveDate,
    member_tracking: Vec<BulkEntry>,
}

#[derive(Debug, Serialize)]
struct BulkUpdateResponse {
    message: String,
    updated_count: usize,
    skipped_member_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ProcessPaymentsRequest {
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ProcessPaymentsResponse {
    message: String,
    processed_count: usize,
    total_records: usize,
}

/// Routes under `/daily-costs` and `/meal-tracking`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/daily-costs", get(list_daily_costs).post(set_daily_cost))
        .route(
            "/daily-costs/{id}",
            get(get_daily_cost)
                .put(update_daily_cost)
                .delete(delete_daily_cost),
        )
        .route("/meal-tracking", get(list_tracking).post(record_tracking))
        .route(
            "/meal-tracking/{id}",
            get(get_tracking).put(update_tracking).delete(delete_tracking),
        )
        .route("/meal-tracking/bulk_update", post(bulk_update))
        .route("/meal-tracking/process_payments", post(process_payments))
}

async fn list_daily_costs(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<DailyCostListQuery>,
) -> Result<Json<Vec<daily_meal_cost::Model>>> {
    let records =
        daily_cost::list_daily_costs(&state.db, query.start_date, query.end_date).await?;
    Ok(Json(records))
}

async fn set_daily_cost(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<SetDailyCostRequest>,
) -> Result<Json<daily_meal_cost::Model>> {
    let record = daily_cost::set_daily_cost(
        &state.db,
        body.date,
        daily_cost::DailyCostInput {
            lunch_cost: body.lunch_cost,
            dinner_cost: body.dinner_cost,
            lunch_participants: body.lunch_participants,
            dinner_participants: body.dinner_participants,
        },
    )
    .await?;
    Ok(Json(record))
}

async fn get_daily_cost(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<daily_meal_cost::Model>> {
    let found = daily_cost::get_daily_cost_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "daily cost",
            id: id.to_string(),
        })?;
    Ok(Json(found))
}

async fn update_daily_cost(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateDailyCostRequest>,
) -> Result<Json<daily_meal_cost::Model>> {
    let record = daily_cost::update_daily_cost(
        &state.db,
        id,
        daily_cost::DailyCostInput {
            lunch_cost: body.lunch_cost,
            dinner_cost: body.dinner_cost,
            lunch_participants: body.lunch_participants,
            dinner_participants: body.dinner_participants,
        },
    )
    .await?;
    Ok(Json(record))
}

async fn delete_daily_cost(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode> {
    daily_cost::delete_daily_cost(&state.db, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn list_tracking(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<TrackingListQuery>,
) -> Result<Json<Vec<meal_tracking::Model>>> {
    let records = tracking::list_tracking(
        &state.db,
        tracking::TrackingFilter {
            member_id: query.member_id,
            date: query.date,
            is_paid: query.is_paid,
        },
    )
    .await?;
    Ok(Json(records))
}

async fn record_tracking(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<RecordTrackingRequest>,
) -> Result<Json<meal_tracking::Model>> {
    let record = tracking::record_tracking(
        &state.db,
        body.member_id,
        body.date,
        body.lunch_count,
        body.dinner_count,
        body.notes,
    )
    .await?;
    Ok(Json(record))
}

async fn get_tracking(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<meal_tracking::Model>> {
    let found = tracking::get_tracking_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "tracking record",
            id: id.to_string(),
        })?;
    Ok(Json(found))
}

async fn update_tracking(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTrackingRequest>,
) -> Result<Json<meal_tracking::Model>> {
    let record = tracking::update_tracking(
        &state.db,
        id,
        body.lunch_count,
        body.dinner_count,
        body.notes,
    )
    .await?;
    Ok(Json(record))
}

async fn delete_tracking(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode> {
    tracking::delete_tracking(&state.db, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn bulk_update(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<BulkUpdateRequest>,
) -> Result<Json<BulkUpdateResponse>> {
    let entries: Vec<tracking::TrackingEntry> = body
        .member_tracking
        .iter()
        .map(|entry| tracking::TrackingEntry {
            member_id: entry.member_id,
            lunch_count: entry.lunch_count,
            dinner_count: entry.dinner_count,
        })
        .collect();

    let outcome = tracking::bulk_record_tracking(&state.db, body.date, &entries).await?;
    Ok(Json(BulkUpdateResponse {
        message: format!("Updated {} meal tracking records", outcome.updated_count),
        updated_count: outcome.updated_count,
        skipped_member_ids: outcome.skipped_member_ids,
    }))
}

async fn process_payments(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<ProcessPaymentsRequest>,
) -> Result<Json<ProcessPaymentsResponse>> {
    let outcome = settlement::process_payments(&state.db, body.date).await?;
    Ok(Json(ProcessPaymentsResponse {
        message: format!("Processed payments for {} members", outcome.processed_count),
        processed_count: outcome.processed_count,
        total_records: outcome.total_eligible,
    }))
}
