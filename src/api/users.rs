//! Registration and login endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::auth::jwt;
use crate::error::{AppError, ErrorCode};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validated(&self) -> Result<(&str, &str), AppError> {
        let login = self.login.trim();
        if login.is_empty() || self.password.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "login and password are required",
            ));
        }
        Ok((login, &self.password))
    }
}

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<serde_json::Value> {
    let (login, password) = req.validated()?;

    let user = state.service.register(login, password).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(serde_json::json!({ "message": "user registered" })))
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<LoginResponse> {
    let (login, password) = req.validated()?;

    let user = state.service.login(login, password).await?;

    let token = jwt::create_token(
        user.id,
        &user.login,
        &state.jwt_issuer,
        state.jwt_ttl_hours,
        &state.jwt_secret,
    )
    .map_err(|err| {
        tracing::error!(error = %err, "token creation failed");
        AppError::new(ErrorCode::Internal)
    })?;

    Ok(Json(LoginResponse { token }))
}
