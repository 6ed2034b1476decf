//! Member and deposit endpoints.

use crate::{
    core::{ledger, member},
    entities::{member as member_entity, monthly_deposit},
    errors::{Error, Result},
    http::{AppState, auth::CurrentMember},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MemberListQuery {
    role: Option<member_entity::MemberRole>,
    status: Option<member_entity::MemberStatus>,
    member_type: Option<member_entity::MemberType>,
}

#[derive(Debug, Deserialize)]
struct CreateMemberRequest {
    username: String,
    password: String,
    full_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    role: Option<member_entity::MemberRole>,
    member_type: Option<member_entity::MemberType>,
    #[serde(default)]
    dietary_restrictions: String,
    #[serde(default)]
    monthly_deposit: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateMemberRequest {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    role: Option<member_entity::MemberRole>,
    status: Option<member_entity::MemberStatus>,
    member_type: Option<member_entity::MemberType>,
    dietary_restrictions: Option<String>,
    monthly_deposit: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DepositListQuery {
    member_id: Option<i64>,
    month: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct CreateDepositRequest {
    member_id: i64,
    amount: f64,
    month: NaiveDate,
    #[serde(default)]
    notes: String,
}

/// Routes under `/members` and `/deposits`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/deposits", get(list_deposits).post(create_deposit))
        .route("/deposits/{id}", get(get_deposit).delete(delete_deposit))
}

async fn list_members(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<Vec<member_entity::Model>>> {
    let members = member::list_members(
        &state.db,
        &member::MemberFilter {
            role: query.role,
            status: query.status,
            member_type: query.member_type,
        },
    )
    .await?;
    Ok(Json(members))
}

async fn create_member(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<member_entity::Model>)> {
    let created = member::create_member(
        &state.db,
        member::NewMember {
            username: body.username,
            password_hash: crate::core::auth::hash_password(&body.password)?,
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
            role: body.role.unwrap_or(member_entity::MemberRole::Member),
            member_type: body
                .member_type
                .unwrap_or(member_entity::MemberType::Employee),
            dietary_restrictions: body.dietary_restrictions,
            monthly_deposit: body.monthly_deposit,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_member(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<member_entity::Model>> {
    let found = member::get_member_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::MemberNotFound { id: id.to_string() })?;
    Ok(Json(found))
}

async fn update_member(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMemberRequest>,
) -> Result<Json<member_entity::Model>> {
    let updated = member::update_member(
        &state.db,
        id,
        member::MemberChanges {
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            status: body.status,
            member_type: body.member_type,
            dietary_restrictions: body.dietary_restrictions,
            monthly_deposit: body.monthly_deposit,
        },
    )
    .await?;
    Ok(Json(updated))
}

async fn delete_member(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    member::delete_member(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_deposits(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<DepositListQuery>,
) -> Result<Json<Vec<monthly_deposit::Model>>> {
    let deposits = ledger::list_deposits(
        &state.db,
        ledger::DepositFilter {
            member_id: query.member_id,
            month: query.month,
        },
    )
    .await?;
    Ok(Json(deposits))
}

async fn create_deposit(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Json(body): Json<CreateDepositRequest>,
) -> Result<(StatusCode, Json<monthly_deposit::Model>)> {
    let created =
        ledger::record_deposit(&state.db, body.member_id, body.amount, body.month, body.notes)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_deposit(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<monthly_deposit::Model>> {
    let found = ledger::get_deposit_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "deposit",
            id: id.to_string(),
        })?;
    Ok(Json(found))
}

async fn delete_deposit(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    ledger::delete_deposit(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
