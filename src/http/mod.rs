//! HTTP interface - axum router, shared state, and error mapping.
//!
//! Handlers are thin shells over `core`: they parse the request, resolve
//! the acting member where one is needed, call a core function, and
//! serialize the result. Every error is recovered here and converted to a
//! structured JSON response; none is fatal to the process.

use crate::errors::{Error, Result};
use axum::{
    Json, Router,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::time::Duration;
use tokio::{
    net::TcpListener,
    signal::{
        ctrl_c,
        unix::{SignalKind, signal},
    },
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Authentication endpoints and the `CurrentMember` extractor
pub mod auth;
/// Expense, budget, and dashboard endpoints
pub mod finance;
/// Meal and ingredient endpoints
pub mod meals;
/// Member and deposit endpoints
pub mod members;
/// Shopping list endpoints
pub mod shopping;
/// Daily cost, meal tracking, and settlement endpoints
pub mod tracking;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON body for plain confirmation responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    /// Builds a confirmation body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Validation { .. }
            | Error::InvalidAmount { .. }
            | Error::InvalidMealCount { .. }
            | Error::DuplicateDeposit { .. }
            | Error::InvalidTransition { .. }
            | Error::Config { .. } => StatusCode::BAD_REQUEST,
            Error::MemberNotFound { .. } | Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Error::Database(..) | Error::Io(..) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(auth::routes())
        .merge(members::routes())
        .merge(meals::routes())
        .merge(shopping::routes())
        .merge(tracking::routes())
        .merge(finance::routes())
        .layer(cors)
        .with_state(state)
}

/// Binds the listener and serves requests until a shutdown signal arrives.
pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Server running on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => error!("Failed to install signal handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
