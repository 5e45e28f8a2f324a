//! API routes.

pub mod balance;
pub mod health;
pub mod orders;
pub mod users;

use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::error::AppError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Assemble the application router.
pub fn create_router(state: AppState) -> Router {
    // Account endpoints behind Bearer authentication
    let account = Router::new()
        .route("/api/user/orders", post(orders::upload).get(orders::list))
        .route("/api/user/balance", get(balance::get_balance))
        .route("/api/user/balance/withdraw", post(balance::withdraw))
        .route("/api/user/withdrawals", get(balance::list_withdrawals))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public registration and login
    let public = Router::new()
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(account)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
