//! Expense, budget, and dashboard endpoints.

use crate::{
    core::{budget, dashboard, expense},
    entities::{budget as budget_entity, expense as expense_entity},
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
struct ExpenseListQuery {
    category: Option<expense_entity::ExpenseCategory>,
    status: Option<expense_entity::ExpenseStatus>,
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct CreateExpenseRequest {
    title: String,
    #[serde(default)]
    description: String,
    amount: f64,
    category: expense_entity::ExpenseCategory,
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct UpdateExpenseRequest {
    title: Option<String>,
    description: Option<String>,
    amount: Option<f64>,
    category: Option<expense_entity::ExpenseCategory>,
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct BudgetListQuery {
    #[serde(default)]
    active_only: bool,
}

#[derive(Debug, Deserialize)]
struct CreateBudgetRequest {
    name: String,
    total_amount: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct UpdateBudgetRequest {
    name: Option<String>,
    total_amount: Option<f64>,
    spent_amount: Option<f64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// A budget with its derived figures.
#[derive(Debug, Serialize)]
struct BudgetView {
    #[serde(flatten)]
    budget: budget_entity::Model,
    remaining_amount: f64,
    utilization_percentage: f64,
}

impl From<budget_entity::Model> for BudgetView {
    fn from(model: budget_entity::Model) -> Self {
        let remaining_amount = model.remaining_amount();
        let utilization_percentage = model.utilization_percentage();
        Self {
            budget: model,
            remaining_amount,
            utilization_percentage,
        }
    }
}

/// Routes under `/expenses`, `/budgets`, and `/dashboard`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/{id}/approve", post(approve_expense))
        .route("/expenses/{id}/reject", post(reject_expense))
        .route("/budgets", get(list_budgets).post(create_budget))
        .route(
            "/budgets/{id}",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route("/dashboard/stats", get(dashboard_stats))
}

async fn list_expenses(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<expense_entity::Model>>> {
    let expenses = expense::list_expenses(
        &state.db,
        &expense::ExpenseFilter {
            category: query.category,
            status: query.status,
            date: query.date,
        },
    )
    .await?;
    Ok(Json(expenses))
}

async fn create_expense(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<expense_entity::Model>)> {
    let created = expense::create_expense(
        &state.db,
        &actor,
        expense::NewExpense {
            title: body.title,
            description: body.description,
            amount: body.amount,
            category: body.category,
            date: body.date,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_expense(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<expense_entity::Model>> {
    let found = expense::get_expense_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "expense",
            id: id.to_string(),
        })?;
    Ok(Json(found))
}

async fn update_expense(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateExpenseRequest>,
) -> Result<Json<expense_entity::Model>> {
    let updated = expense::update_expense(
        &state.db,
        id,
        expense::ExpenseChanges {
            title: body.title,
            description: body.description,
            amount: body.amount,
            category: body.category,
            date: body.date,
        },
    )
    .await?;
    Ok(Json(updated))
}

async fn delete_expense(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    expense::delete_expense(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve_expense(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<expense_entity::Model>> {
    let approved = expense::approve_expense(&state.db, id, &actor).await?;
    Ok(Json(approved))
}

async fn reject_expense(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<expense_entity::Model>> {
    let rejected = expense::reject_expense(&state.db, id, &actor).await?;
    Ok(Json(rejected))
}

async fn list_budgets(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Query(query): Query<BudgetListQuery>,
) -> Result<Json<Vec<BudgetView>>> {
    let active_on = query
        .active_only
        .then(|| chrono::Utc::now().date_naive());
    let budgets = budget::list_budgets(&state.db, active_on).await?;
    Ok(Json(budgets.into_iter().map(BudgetView::from).collect()))
}

async fn create_budget(
    State(state): State<AppState>,
    CurrentMember(actor): CurrentMember,
    Json(body): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<BudgetView>)> {
    let created = budget::create_budget(
        &state.db,
        &actor,
        budget::NewBudget {
            name: body.name,
            total_amount: body.total_amount,
            start_date: body.start_date,
            end_date: body.end_date,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_budget(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<Json<BudgetView>> {
    let found = budget::get_budget_by_id(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "budget",
            id: id.to_string(),
        })?;
    Ok(Json(found.into()))
}

async fn update_budget(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBudgetRequest>,
) -> Result<Json<BudgetView>> {
    let updated = budget::update_budget(
        &state.db,
        id,
        budget::BudgetChanges {
            name: body.name,
            total_amount: body.total_amount,
            spent_amount: body.spent_amount,
            start_date: body.start_date,
            end_date: body.end_date,
        },
    )
    .await?;
    Ok(Json(updated.into()))
}

async fn delete_budget(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    budget::delete_budget(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard_stats(
    State(state): State<AppState>,
    CurrentMember(_): CurrentMember,
) -> Result<Json<dashboard::DashboardStats>> {
    let stats = dashboard::get_dashboard_stats(&state.db, chrono::Utc::now().date_naive()).await?;
    Ok(Json(stats))
}
