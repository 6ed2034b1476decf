//! Meal and ingredient endpoints.

use crate::{
    core::meal,
    entities::{ingredient, meal as meal_entity},
    errors::{Error, Result},
    http::{AppState, auth::CurrentMember},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct MealListQuery {
    meal_type: Option<meal_entity::MealType>,
    status: Option<meal_entity::MealStatus>,
    date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct CreateMealRequest {
    name: String,
    #[serde(default)]
    description: String,
    meal_type: meal_entity::MealType,
    date: NaiveDate,
    time: NaiveTime,
    estimated_cost: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateMealRequest {
    name: Option<String>,
    description: Option<String>,
    meal_type: Option<meal_entity::MealType>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    estimated_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CompleteMealRequest {
    actual_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AddIngredientRequest {
    name: String,
    quantity: f64,
    unit: ingredient::IngredientUnit,
    estimated_cost: f64,
}

/// A meal with its ingredient lines.
#[derive(Debug, Serialize)]
struct MealDetail {
    #[serde(flatten)]
    meal: meal_entity::Model,
    ingredients: Vec<ingredient::Model>,
}

/// Routes under `/meals`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route(
            "/meals/{id}",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
        .route("/meals/{id}/approve", post(approve_meal))
        .route("/meals/{id}/complete", post(complete_meal))
        .route("/meals/{id}/cancel", post(cancel_meal))
        .route(
            "/meals/{id}/ingredients",
            get(list_ingredients).post(add_ingredient),
        )
        .route(
            "/meals/{id}/ingredients/{ingredient_id}",
            axum::routing::delete(delete_ingredient),
        )
}

async fn list_meals(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<MealListQuery>,
) -> Result<Json<Vec<meal_entity::Model>>> {
    let meals = meal::list_meals(
        &state.db,
        &meal::MealFilter {
            meal_type: query.meal_type,
            status: query.status,
            date: query.date,
            start_date: query.start_date,
            end_date: query.end_date,
        },
    )
    .await?;
    Ok(Json(meals))
}

async fn create_meal(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<meal_entity::Model>)> {
    let created = meal::create_meal(
        &state.db,
        &actor,
        meal::NewMeal {
            name: body.name,
            description: body.description,
            meal_type: body.meal_type,
            date: body.date,
            time: body.time,
            estimated_cost: body.estimated_cost,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<MealDetail>> {
    let found = meal::get_meal_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "meal",
            id: id.to_string(),
        })?;
    let ingredients = meal::list_ingredients(&state.db, id).await?;
    Ok(Json(MealDetail {
        meal: found,
        ingredients,
    }))
}

async fn update_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<Json<meal_entity::Model>> {
    let updated = meal::update_meal(
        &state.db,
        id,
        meal::MealChanges {
            name: body.name,
            description: body.description,
            meal_type: body.meal_type,
            date: body.date,
            time: body.time,
            estimated_cost: body.estimated_cost,
        },
    )
    .await?;
    Ok(Json(updated))
}

async fn delete_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    meal::delete_meal(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<meal_entity::Model>> {
    let approved = meal::approve_meal(&state.db, id).await?;
    Ok(Json(approved))
}

async fn complete_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<CompleteMealRequest>,
) -> Result<Json<meal_entity::Model>> {
    let prepared = meal::complete_meal(&state.db, id, body.actual_cost).await?;
    Ok(Json(prepared))
}

async fn cancel_meal(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<meal_entity::Model>> {
    let cancelled = meal::cancel_meal(&state.db, id).await?;
    Ok(Json(cancelled))
}

async fn list_ingredients(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ingredient::Model>>> {
    let lines = meal::list_ingredients(&state.db, id).await?;
    Ok(Json(lines))
}

async fn add_ingredient(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<AddIngredientRequest>,
) -> Result<(StatusCode, Json<ingredient::Model>)> {
    let line = meal::add_ingredient(
        &state.db,
        id,
        meal::NewIngredient {
            name: body.name,
            quantity: body.quantity,
            unit: body.unit,
            estimated_cost: body.estimated_cost,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path((id, ingredient_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    meal::delete_ingredient(&state.db, id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
