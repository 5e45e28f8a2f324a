//! Request authentication: Bearer-token middleware, JWT helpers, password
//! hashing.

pub mod jwt;
pub mod password;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::{AppError, ErrorCode};
use crate::state::AppState;

/// Authenticated identity resolved for this request. Handlers receive it
/// through request extensions and pass the user id into the core
/// explicitly; nothing below the handlers reads request state.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub login: String,
}

/// Verifies the Bearer token, resolves the user through the identity cache
/// and stores an [`Identity`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = jwt::bearer_token(header).ok_or_else(unauthorized)?;

    let claims = jwt::verify_token(token, &state.jwt_issuer, &state.jwt_secret).map_err(|err| {
        tracing::debug!(error = %err, "token verification failed");
        unauthorized()
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| unauthorized())?;

    // Read-through lookup: confirms the subject still exists and warms the
    // identity cache for subsequent requests.
    let user = state
        .service
        .user_by_id(user_id)
        .await
        .map_err(|err| err.into_response())?;

    request.extensions_mut().insert(Identity {
        user_id: user.id,
        login: user.login,
    });

    Ok(next.run(request).await)
}

fn unauthorized() -> Response {
    AppError::new(ErrorCode::Unauthorized).into_response()
}
