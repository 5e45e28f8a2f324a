//! Registration, credential verification and cached identity resolution.

use uuid::Uuid;

use super::{Operation, Service, USER_CACHE_TTL, classify};
use crate::auth::password;
use crate::error::{AppError, ErrorCode};
use crate::model::User;

impl Service {
    /// Register a new account. The user and their zero balance are created
    /// in one transaction; a taken login classifies to `LoginInUse`.
    pub async fn register(&self, login: &str, raw_password: &str) -> Result<User, AppError> {
        let password_hash = password::hash_password(raw_password).map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            AppError::new(ErrorCode::Internal)
        })?;

        self.store
            .create_user(login, &password_hash)
            .await
            .map_err(|err| classify(err, Operation::RegisterUser))
    }

    /// Verify credentials and return the account. Token issuance is the
    /// transport layer's job.
    pub async fn login(&self, login: &str, raw_password: &str) -> Result<User, AppError> {
        let user = self
            .store
            .user_by_login(login)
            .await
            .map_err(|err| classify(err, Operation::LoginUser))?;

        if !password::verify_password(raw_password, &user.password_hash) {
            return Err(AppError::new(ErrorCode::InvalidCredentials));
        }

        Ok(user)
    }

    /// Resolve a user by id through the identity cache.
    ///
    /// Cache failures on either side of the store read are logged and
    /// swallowed; the cache is a latency optimization, never a correctness
    /// dependency.
    pub async fn user_by_id(&self, user_id: Uuid) -> Result<User, AppError> {
        match self.cache.get(user_id).await {
            Ok(Some(user)) => {
                tracing::debug!(%user_id, "identity cache hit");
                return Ok(user);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "identity cache read failed");
            }
        }

        let user = self
            .store
            .user_by_id(user_id)
            .await
            .map_err(|err| classify(err, Operation::GetUserById))?;

        if let Err(err) = self.cache.set(user_id, &user, USER_CACHE_TTL).await {
            tracing::warn!(%user_id, error = %err, "identity cache write failed");
        }

        Ok(user)
    }
}
