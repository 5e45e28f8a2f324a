//! PostgreSQL adapter for the durable store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StorageError, StorageErrorCode, Store, WithdrawalAttempt};
use crate::model::{Balance, Order, OrderStatus, User, Withdrawal};

/// Translate a driver error into the closed storage code set. Postgres
/// surfaces constraint failures as SQLSTATE codes; anything unrecognized
/// collapses to `Undefined`/`Unknown` and keeps its message for the logs.
fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::RowNotFound => {
            StorageError::new(StorageErrorCode::NoRows, "no rows in result set")
        }
        sqlx::Error::Database(db) => {
            let code = match db.code().as_deref() {
                Some("23505") => StorageErrorCode::UniqueViolation,
                Some("23503") => StorageErrorCode::ForeignKeyViolation,
                Some("23502") => StorageErrorCode::NotNullViolation,
                Some("23514") => StorageErrorCode::CheckViolation,
                Some("40001") => StorageErrorCode::Serialization,
                Some("40P01") => StorageErrorCode::Deadlock,
                _ => StorageErrorCode::Undefined,
            };
            StorageError::new(code, db.message().to_string())
        }
        other => StorageError::new(StorageErrorCode::Unknown, other.to_string()),
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    login: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            login: row.login,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    number: String,
    status: String,
    accrual: Option<i64>,
    uploaded_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, StorageError> {
        let status = OrderStatus::from_db(&self.status).ok_or_else(|| {
            StorageError::new(
                StorageErrorCode::Unknown,
                format!("unexpected order status '{}'", self.status),
            )
        })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            number: self.number,
            status,
            accrual: self.accrual,
            uploaded_at: self.uploaded_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BalanceRow {
    user_id: Uuid,
    current: i64,
    withdrawn: i64,
}

impl From<BalanceRow> for Balance {
    fn from(row: BalanceRow) -> Self {
        Balance {
            user_id: row.user_id,
            current: row.current,
            withdrawn: row.withdrawn,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WithdrawalRow {
    id: Uuid,
    user_id: Uuid,
    order_number: String,
    amount: i64,
    processed_at: DateTime<Utc>,
}

impl From<WithdrawalRow> for Withdrawal {
    fn from(row: WithdrawalRow) -> Self {
        Withdrawal {
            id: row.id,
            user_id: row.user_id,
            order_number: row.order_number,
            amount: row.amount,
            processed_at: row.processed_at,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (login, password_hash)
             VALUES ($1, $2)
             RETURNING id, login, password_hash, created_at",
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("INSERT INTO balances (user_id, current, withdrawn) VALUES ($1, 0, 0)")
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn user_by_login(&self, login: &str) -> Result<User, StorageError> {
        let row: UserRow = sqlx::query_as(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StorageError> {
        let row: UserRow =
            sqlx::query_as("SELECT id, login, password_hash, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn create_order(&self, user_id: Uuid, number: &str) -> Result<Order, StorageError> {
        let row: OrderRow = sqlx::query_as(
            "INSERT INTO orders (user_id, number)
             VALUES ($1, $2)
             RETURNING id, user_id, number, status, accrual, uploaded_at",
        )
        .bind(user_id)
        .bind(number)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.into_order()
    }

    async fn order_exists_for_user(
        &self,
        number: &str,
        user_id: Uuid,
    ) -> Result<bool, StorageError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE number = $1 AND user_id = $2)",
        )
        .bind(number)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn order_number_exists(&self, number: &str) -> Result<bool, StorageError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE number = $1)")
            .bind(number)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StorageError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, number, status, accrual, uploaded_at
             FROM orders WHERE user_id = $1
             ORDER BY uploaded_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        rows.into_iter().map(OrderRow::into_order).collect()
    }

    async fn balance(&self, user_id: Uuid) -> Result<Balance, StorageError> {
        let row: BalanceRow =
            sqlx::query_as("SELECT user_id, current, withdrawn FROM balances WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn execute_withdrawal(
        &self,
        user_id: Uuid,
        order_number: &str,
        amount: i64,
    ) -> Result<WithdrawalAttempt, StorageError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Row-level exclusive lock: the compare below and the update stay
        // serialized per user for the lifetime of the transaction.
        let balance: BalanceRow = sqlx::query_as(
            "SELECT user_id, current, withdrawn FROM balances WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if balance.current < amount {
            // Dropping the transaction rolls back and releases the lock.
            return Ok(WithdrawalAttempt::InsufficientFunds);
        }

        let row: WithdrawalRow = sqlx::query_as(
            "INSERT INTO withdrawals (user_id, order_number, amount)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, order_number, amount, processed_at",
        )
        .bind(user_id)
        .bind(order_number)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "UPDATE balances SET current = current - $1, withdrawn = withdrawn + $1
             WHERE user_id = $2",
        )
        .bind(amount)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(WithdrawalAttempt::Completed(row.into()))
    }

    async fn withdrawals_for_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>, StorageError> {
        let rows: Vec<WithdrawalRow> = sqlx::query_as(
            "SELECT id, user_id, order_number, amount, processed_at
             FROM withdrawals WHERE user_id = $1
             ORDER BY processed_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Withdrawal::from).collect())
    }
}
