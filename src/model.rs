//! Domain model types shared across the service, store and API layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Immutable after creation.
///
/// Serialization is needed for the identity cache envelope; the password
/// hash never crosses the HTTP boundary (API responses use their own view
/// types).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of an uploaded order. Intake always creates orders as `New`;
/// the external accrual process moves them through the remaining states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "PROCESSING" => Some(Self::Processing),
            "INVALID" => Some(Self::Invalid),
            "PROCESSED" => Some(Self::Processed),
            _ => None,
        }
    }
}

/// An uploaded order. `accrual` is in minor units and stays `None` until
/// the accrual process has assigned a value.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub number: String,
    pub status: OrderStatus,
    pub accrual: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
}

/// Per-user point balance in minor units. `current` never goes negative;
/// `withdrawn` only grows.
#[derive(Debug, Clone, Copy)]
pub struct Balance {
    pub user_id: Uuid,
    pub current: i64,
    pub withdrawn: i64,
}

/// A committed withdrawal. Created once, never mutated.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub amount: i64,
    pub processed_at: DateTime<Utc>,
}
