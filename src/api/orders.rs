//! Order upload and listing endpoints.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::error::AppError;
use crate::model::{Order, OrderStatus};
use crate::money;
use crate::service::SubmitOutcome;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UploadOrderRequest {
    pub number: String,
}

/// POST /api/user/orders
///
/// 202 for a newly accepted order, 200 when this user already uploaded the
/// number (idempotent re-submission).
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UploadOrderRequest>,
) -> Result<Response, AppError> {
    match state
        .service
        .submit_order(identity.user_id, &req.number)
        .await?
    {
        SubmitOutcome::Accepted(order) => {
            tracing::info!(user_id = %identity.user_id, number = %order.number, "order accepted");
            Ok(StatusCode::ACCEPTED.into_response())
        }
        SubmitOutcome::AlreadyUploaded => Ok(StatusCode::OK.into_response()),
    }
}

#[derive(Serialize)]
pub struct OrderView {
    pub number: String,
    pub status: OrderStatus,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            status: order.status,
            accrual: order.accrual.map(money::to_major),
            uploaded_at: order.uploaded_at,
        }
    }
}

/// GET /api/user/orders — 204 when the user has no orders.
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, AppError> {
    let orders = state.service.orders(identity.user_id).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let views: Vec<OrderView> = orders.into_iter().map(OrderView::from).collect();
    Ok(Json(views).into_response())
}
