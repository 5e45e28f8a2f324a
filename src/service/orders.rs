//! Order intake.

use uuid::Uuid;

use super::{Operation, Service, classify};
use crate::error::{AppError, ErrorCode};
use crate::luhn;
use crate::model::Order;

/// Successful intake outcomes. Re-submission by the owner is a no-op
/// success, not an error.
#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted(Order),
    AlreadyUploaded,
}

impl Service {
    /// Submit an order number for accrual.
    ///
    /// Validation happens before any storage access. The (number, user)
    /// pre-check makes re-submission idempotent; the store-wide unique
    /// constraint catches the same number owned by a different user, which
    /// classifies to `OrderConflict`.
    pub async fn submit_order(
        &self,
        user_id: Uuid,
        number: &str,
    ) -> Result<SubmitOutcome, AppError> {
        if !luhn::is_valid(number) {
            return Err(AppError::new(ErrorCode::InvalidOrderNumber));
        }

        let already_uploaded = self
            .store
            .order_exists_for_user(number, user_id)
            .await
            .map_err(|err| classify(err, Operation::CreateOrder))?;
        if already_uploaded {
            return Ok(SubmitOutcome::AlreadyUploaded);
        }

        let order = self
            .store
            .create_order(user_id, number)
            .await
            .map_err(|err| classify(err, Operation::CreateOrder))?;

        Ok(SubmitOutcome::Accepted(order))
    }

    /// The user's uploaded orders, oldest first.
    pub async fn orders(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.store
            .orders_for_user(user_id)
            .await
            .map_err(|err| classify(err, Operation::ListOrders))
    }
}
