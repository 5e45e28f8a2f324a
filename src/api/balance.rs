//! Balance and withdrawal endpoints.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::auth::Identity;
use crate::error::AppError;
use crate::model::Withdrawal;
use crate::money;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
}

/// GET /api/user/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<BalanceResponse> {
    let balance = state.service.balance(identity.user_id).await?;
    Ok(Json(BalanceResponse {
        current: balance.current,
        withdrawn: balance.withdrawn,
    }))
}

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

/// POST /api/user/balance/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<serde_json::Value> {
    let withdrawal = state
        .service
        .withdraw(identity.user_id, &req.order, req.sum)
        .await?;

    tracing::info!(
        user_id = %identity.user_id,
        order_number = %withdrawal.order_number,
        amount = withdrawal.amount,
        "withdrawal processed"
    );

    Ok(Json(serde_json::json!({ "message": "withdrawal processed" })))
}

#[derive(Serialize)]
pub struct WithdrawalView {
    #[serde(rename = "order")]
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            order_number: withdrawal.order_number,
            sum: money::to_major(withdrawal.amount),
            processed_at: withdrawal.processed_at,
        }
    }
}

/// GET /api/user/withdrawals — 204 when the user has none.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, AppError> {
    let withdrawals = state.service.withdrawals(identity.user_id).await?;
    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let views: Vec<WithdrawalView> = withdrawals.into_iter().map(WithdrawalView::from).collect();
    Ok(Json(views).into_response())
}
