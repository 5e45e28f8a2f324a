//! Storage seams: the durable store and the identity cache.
//!
//! Both collaborators sit behind object-safe traits so the service layer can
//! be exercised against in-memory doubles. The production adapters are
//! [`postgres::PgStore`] and [`redis_cache::RedisUserCache`].

pub mod postgres;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Balance, Order, User, Withdrawal};

/// Closed set of storage failure codes. The service layer maps a
/// `(code, operation)` pair to a domain outcome; nothing downstream ever
/// inspects driver-level detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorCode {
    UniqueViolation,
    ForeignKeyViolation,
    NoRows,
    CheckViolation,
    NotNullViolation,
    Serialization,
    Deadlock,
    /// Database error with a code outside the recognized set
    Undefined,
    /// Failure that never reached the database (pool, IO, decode)
    Unknown,
}

#[derive(Debug, thiserror::Error)]
#[error("storage error [{code:?}]: {message}")]
pub struct StorageError {
    pub code: StorageErrorCode,
    pub message: String,
}

impl StorageError {
    pub fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result of an attempted withdrawal. Insufficient funds is a normal
/// outcome of the locked balance check, not a storage failure.
#[derive(Debug)]
pub enum WithdrawalAttempt {
    Completed(Withdrawal),
    InsufficientFunds,
}

/// Durable transactional store.
///
/// Multi-step operations (`create_user`, `execute_withdrawal`) are atomic:
/// either every step is visible or none. `execute_withdrawal` additionally
/// serializes per user, so concurrent withdrawals against one balance can
/// never both observe sufficient funds and both commit.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a user together with a zero balance. Fails with
    /// `UniqueViolation` when the login is taken.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, StorageError>;

    /// Fails with `NoRows` when the login is unknown.
    async fn user_by_login(&self, login: &str) -> Result<User, StorageError>;

    /// Fails with `NoRows` when the id is unknown.
    async fn user_by_id(&self, id: Uuid) -> Result<User, StorageError>;

    /// Insert a new order in status NEW. Fails with `UniqueViolation` when
    /// the number exists anywhere in the store.
    async fn create_order(&self, user_id: Uuid, number: &str) -> Result<Order, StorageError>;

    /// Whether this user already uploaded this number.
    async fn order_exists_for_user(
        &self,
        number: &str,
        user_id: Uuid,
    ) -> Result<bool, StorageError>;

    /// Whether any user uploaded this number.
    async fn order_number_exists(&self, number: &str) -> Result<bool, StorageError>;

    /// The user's orders, ascending by upload time.
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StorageError>;

    async fn balance(&self, user_id: Uuid) -> Result<Balance, StorageError>;

    /// Atomically: lock the balance row, compare against `amount` (minor
    /// units), insert the withdrawal and debit/credit the balance.
    async fn execute_withdrawal(
        &self,
        user_id: Uuid,
        order_number: &str,
        amount: i64,
    ) -> Result<WithdrawalAttempt, StorageError>;

    /// The user's withdrawals, ascending by processed time.
    async fn withdrawals_for_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// Best-effort identity cache. Every failure here is recoverable; callers
/// fall back to the durable store and never surface a `CacheError`.
#[async_trait]
pub trait UserCache: Send + Sync {
    /// `Ok(None)` is a miss; an entry past its recorded expiry counts as a
    /// miss and is evicted in the background.
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, CacheError>;

    async fn set(&self, user_id: Uuid, user: &User, ttl: Duration) -> Result<(), CacheError>;

    /// Unused while users are immutable; any future user mutation path must
    /// call this on every write.
    async fn delete(&self, user_id: Uuid) -> Result<(), CacheError>;
}
