//! Shopping list endpoints.

use crate::{
    core::shopping,
    entities::{shopping_item, shopping_list},
    errors::{Error, Result},
    http::{AppState, auth::CurrentMember},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ShoppingListQuery {
    status: Option<shopping_list::ShoppingStatus>,
}

#[derive(Debug, Deserialize)]
struct CreateListRequest {
    name: String,
    date_needed: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct UpdateListRequest {
    name: Option<String>,
    date_needed: Option<NaiveDate>,
    status: Option<shopping_list::ShoppingStatus>,
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    name: String,
    quantity: f64,
    unit: String,
    estimated_cost: f64,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
struct MarkPurchasedRequest {
    item_id: i64,
    actual_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    message: String,
    item_count: usize,
    meal_count: usize,
}

/// A shopping list with its items.
#[derive(Debug, Serialize)]
struct ShoppingListDetail {
    #[serde(flatten)]
    list: shopping_list::Model,
    items: Vec<shopping_item::Model>,
}

/// Routes under `/shopping-lists`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-lists", get(list_lists).post(create_list))
        .route(
            "/shopping-lists/{id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/shopping-lists/{id}/items", post(add_item))
        .route(
            "/shopping-lists/{id}/mark_item_purchased",
            post(mark_item_purchased),
        )
        .route(
            "/shopping-lists/{id}/generate_from_meals",
            post(generate_from_meals),
        )
}

async fn list_lists(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<ShoppingListQuery>,
) -> Result<Json<Vec<shopping_list::Model>>> {
    let lists = shopping::list_shopping_lists(&state.db, query.status).await?;
    Ok(Json(lists))
}

async fn create_list(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<shopping_list::Model>)> {
    let created = shopping::create_shopping_list(
        &state.db,
        &actor,
        shopping::NewShoppingList {
            name: body.name,
            date_needed: body.date_needed,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_list(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<ShoppingListDetail>> {
    let found = shopping::get_shopping_list_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "shopping list",
            id: id.to_string(),
        })?;
    let items = shopping::list_items(&state.db, id).await?;
    Ok(Json(ShoppingListDetail { list: found, items }))
}

async fn update_list(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateListRequest>,
) -> Result<Json<shopping_list::Model>> {
    let updated = shopping::update_shopping_list(
        &state.db,
        id,
        shopping::ShoppingListChanges {
            name: body.name,
            date_needed: body.date_needed,
            status: body.status,
        },
    )
    .await?;
    Ok(Json(updated))
}

async fn delete_list(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    shopping::delete_shopping_list(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_item(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<shopping_item::Model>)> {
    let item = shopping::add_item(
        &state.db,
        id,
        shopping::NewShoppingItem {
            name: body.name,
            quantity: body.quantity,
            unit: body.unit,
            estimated_cost: body.estimated_cost,
            notes: body.notes,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn mark_item_purchased(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<MarkPurchasedRequest>,
) -> Result<Json<shopping_item::Model>> {
    let item =
        shopping::mark_item_purchased(&state.db, id, body.item_id, body.actual_cost).await?;
    Ok(Json(item))
}

async fn generate_from_meals(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let outcome =
        shopping::generate_from_meals(&state.db, id, body.start_date, body.end_date).await?;
    Ok(Json(GenerateResponse {
        message: format!(
            "Generated {} items from {} meals",
            outcome.item_count, outcome.meal_count
        ),
        item_count: outcome.item_count,
        meal_count: outcome.meal_count,
    }))
}
