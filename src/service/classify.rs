//! Storage-error classification.
//!
//! The same storage failure means different things depending on which
//! logical operation produced it: a unique violation during registration is
//! "login in use", during order intake it is "uploaded by another user".
//! The mapping is therefore keyed by the `(code, operation)` pair; any pair
//! outside the table collapses to one opaque internal error, with the full
//! storage detail kept in the logs only.

use crate::error::{AppError, ErrorCode};
use crate::store::{StorageError, StorageErrorCode};

/// Logical operation that triggered a storage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RegisterUser,
    LoginUser,
    GetUserById,
    CreateOrder,
    ListOrders,
    GetBalance,
    Withdraw,
    ListWithdrawals,
}

pub fn classify(err: StorageError, operation: Operation) -> AppError {
    use Operation as Op;
    use StorageErrorCode as Code;

    let code = match (err.code, operation) {
        (Code::UniqueViolation, Op::RegisterUser) => ErrorCode::LoginInUse,
        (Code::UniqueViolation, Op::CreateOrder) => ErrorCode::OrderConflict,
        (Code::NoRows, Op::LoginUser) => ErrorCode::UserNotFound,
        (Code::NoRows, Op::GetUserById) => ErrorCode::Unauthorized,
        // Backstop for the CHECK (current >= 0) constraint; the locked
        // balance comparison normally reports this before the database can.
        (Code::CheckViolation, Op::Withdraw) => ErrorCode::InsufficientFunds,
        _ => {
            tracing::error!(
                storage_code = ?err.code,
                ?operation,
                detail = %err.message,
                "unclassified storage error"
            );
            ErrorCode::Internal
        }
    };

    AppError::new(code)
}
