//! Authentication endpoints and the current-member extractor.
//!
//! The `CurrentMember` extractor is the boundary between the opaque token
//! scheme and the rest of the crate: handlers receive a fully resolved
//! member model and pass it into core operations explicitly.

use crate::{
    core::auth,
    entities::member,
    errors::{Error, Result},
    http::{AppState, MessageResponse},
};
use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// The member resolved from the request's bearer token.
pub struct CurrentMember(pub member::Model);

impl FromRequestParts<AppState> for CurrentMember {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| Error::Unauthorized {
            message: "Authorization header must be a bearer token".to_string(),
        })?;

        let resolved = auth::resolve_access_token(&state.db, token).await?;
        Ok(Self(resolved))
    }
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
    full_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct ProfileUpdate {
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    dietary_restrictions: Option<String>,
}

/// Member plus the token pair issued for it.
#[derive(Debug, Serialize)]
struct AuthResponse {
    member: member::Model,
    access: String,
    refresh: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access: String,
    refresh: String,
}

/// Routes under `/auth`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/token/refresh", post(refresh))
        .route("/auth/profile", get(profile).put(update_profile))
        .route("/auth/change-password", post(change_password))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (created, tokens) = auth::register(
        &state.db,
        auth::Registration {
            username: body.username,
            password: body.password,
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            member: created,
            access: tokens.access,
            refresh: tokens.refresh,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (resolved, tokens) = auth::login(&state.db, &body.username, &body.password).await?;
    Ok(Json(AuthResponse {
        member: resolved,
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}

async fn logout(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
) -> Result<Json<MessageResponse>> {
    auth::logout(&state.db, actor.id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    let tokens = auth::refresh_access_token(&state.db, &body.refresh).await?;
    Ok(Json(TokenResponse {
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}

async fn profile(CurrentMember(actor): CurrentMember) -> Json<member::Model> {
    Json(actor)
}

async fn update_profile(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<member::Model>> {
    let updated = crate::core::member::update_member(
        &state.db,
        actor.id,
        crate::core::member::MemberChanges {
            full_name: body.full_name,
            email: body.email,
            phone: body.phone,
            dietary_restrictions: body.dietary_restrictions,
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(updated))
}

async fn change_password(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    auth::change_password(&state.db, actor.id, &body.old_password, &body.new_password).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}
