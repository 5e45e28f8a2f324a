//! In-memory doubles for the durable store and the identity cache.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use pointsmart::model::{Balance, Order, OrderStatus, User, Withdrawal};
use pointsmart::store::{
    CacheError, StorageError, StorageErrorCode, Store, UserCache, WithdrawalAttempt,
};

#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    orders: Vec<Order>,
    balances: HashMap<Uuid, (i64, i64)>,
    withdrawals: Vec<Withdrawal>,
}

/// Durable-store double. A single mutex around the whole state makes every
/// operation atomic, mirroring the per-user serialization the Postgres
/// adapter gets from its row lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing registration.
    pub fn seed_user(&self, login: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().expect("store mutex");
        inner.users.push(user.clone());
        inner.balances.insert(user.id, (0, 0));
        user
    }

    pub fn set_balance(&self, user_id: Uuid, current: i64, withdrawn: i64) {
        let mut inner = self.inner.lock().expect("store mutex");
        inner.balances.insert(user_id, (current, withdrawn));
    }

    pub fn balance_of(&self, user_id: Uuid) -> (i64, i64) {
        let inner = self.inner.lock().expect("store mutex");
        inner.balances[&user_id]
    }

    pub fn order_rows_for_number(&self, number: &str) -> usize {
        let inner = self.inner.lock().expect("store mutex");
        inner.orders.iter().filter(|o| o.number == number).count()
    }

    pub fn withdrawal_rows(&self, user_id: Uuid) -> Vec<Withdrawal> {
        let inner = self.inner.lock().expect("store mutex");
        inner
            .withdrawals
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, StorageError> {
        let mut inner = self.inner.lock().expect("store mutex");
        if inner.users.iter().any(|u| u.login == login) {
            return Err(StorageError::new(
                StorageErrorCode::UniqueViolation,
                "duplicate key value violates unique constraint \"users_login_key\"",
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        inner.balances.insert(user.id, (0, 0));
        Ok(user)
    }

    async fn user_by_login(&self, login: &str) -> Result<User, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        inner
            .users
            .iter()
            .find(|u| u.login == login)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorCode::NoRows, "no rows in result set"))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorCode::NoRows, "no rows in result set"))
    }

    async fn create_order(&self, user_id: Uuid, number: &str) -> Result<Order, StorageError> {
        let mut inner = self.inner.lock().expect("store mutex");
        if inner.orders.iter().any(|o| o.number == number) {
            return Err(StorageError::new(
                StorageErrorCode::UniqueViolation,
                "duplicate key value violates unique constraint \"orders_number_key\"",
            ));
        }
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            number: number.to_string(),
            status: OrderStatus::New,
            accrual: None,
            uploaded_at: Utc::now(),
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn order_exists_for_user(
        &self,
        number: &str,
        user_id: Uuid,
    ) -> Result<bool, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        Ok(inner
            .orders
            .iter()
            .any(|o| o.number == number && o.user_id == user_id))
    }

    async fn order_number_exists(&self, number: &str) -> Result<bool, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        Ok(inner.orders.iter().any(|o| o.number == number))
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn balance(&self, user_id: Uuid) -> Result<Balance, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        let (current, withdrawn) = inner
            .balances
            .get(&user_id)
            .copied()
            .ok_or_else(|| StorageError::new(StorageErrorCode::NoRows, "no rows in result set"))?;
        Ok(Balance {
            user_id,
            current,
            withdrawn,
        })
    }

    async fn execute_withdrawal(
        &self,
        user_id: Uuid,
        order_number: &str,
        amount: i64,
    ) -> Result<WithdrawalAttempt, StorageError> {
        let mut inner = self.inner.lock().expect("store mutex");
        let (current, withdrawn) = inner
            .balances
            .get(&user_id)
            .copied()
            .ok_or_else(|| StorageError::new(StorageErrorCode::NoRows, "no rows in result set"))?;

        if current < amount {
            return Ok(WithdrawalAttempt::InsufficientFunds);
        }

        let withdrawal = Withdrawal {
            id: Uuid::new_v4(),
            user_id,
            order_number: order_number.to_string(),
            amount,
            processed_at: Utc::now(),
        };
        inner.withdrawals.push(withdrawal.clone());
        inner
            .balances
            .insert(user_id, (current - amount, withdrawn + amount));

        Ok(WithdrawalAttempt::Completed(withdrawal))
    }

    async fn withdrawals_for_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>, StorageError> {
        let inner = self.inner.lock().expect("store mutex");
        Ok(inner
            .withdrawals
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Identity-cache double honoring per-entry TTLs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Uuid, (User, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.entries
            .lock()
            .expect("cache mutex")
            .contains_key(&user_id)
    }
}

#[async_trait]
impl UserCache for MemoryCache {
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, CacheError> {
        let mut entries = self.entries.lock().expect("cache mutex");
        match entries.get(&user_id) {
            Some((user, expires_at)) if Instant::now() < *expires_at => Ok(Some(user.clone())),
            Some(_) => {
                entries.remove(&user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, user_id: Uuid, user: &User, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .expect("cache mutex")
            .insert(user_id, (user.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), CacheError> {
        self.entries.lock().expect("cache mutex").remove(&user_id);
        Ok(())
    }
}

/// Cache double that fails every call, for degradation tests.
pub struct FailingCache;

#[async_trait]
impl UserCache for FailingCache {
    async fn get(&self, _user_id: Uuid) -> Result<Option<User>, CacheError> {
        Err(CacheError("cache offline".to_string()))
    }

    async fn set(&self, _user_id: Uuid, _user: &User, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError("cache offline".to_string()))
    }

    async fn delete(&self, _user_id: Uuid) -> Result<(), CacheError> {
        Err(CacheError("cache offline".to_string()))
    }
}
