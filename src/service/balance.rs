//! Balance ledger: reads and the hardened withdrawal path.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Operation, Service, classify};
use crate::error::{AppError, ErrorCode};
use crate::model::Withdrawal;
use crate::{luhn, money};

/// Balance in major units, as exposed at the boundary.
#[derive(Debug, Clone, Copy)]
pub struct BalanceView {
    pub current: Decimal,
    pub withdrawn: Decimal,
}

impl Service {
    pub async fn balance(&self, user_id: Uuid) -> Result<BalanceView, AppError> {
        let balance = self
            .store
            .balance(user_id)
            .await
            .map_err(|err| classify(err, Operation::GetBalance))?;

        Ok(BalanceView {
            current: money::to_major(balance.current),
            withdrawn: money::to_major(balance.withdrawn),
        })
    }

    /// Withdraw accrued points against an order number.
    ///
    /// The order-number check is existence-only: it deliberately does not
    /// verify ownership or prior withdrawals against the same number. The
    /// balance comparison and the debit/credit run inside one locked store
    /// transaction, so concurrent withdrawals serialize per user.
    pub async fn withdraw(
        &self,
        user_id: Uuid,
        order_number: &str,
        sum: Decimal,
    ) -> Result<Withdrawal, AppError> {
        if !luhn::is_valid(order_number) {
            return Err(AppError::new(ErrorCode::InvalidOrderNumber));
        }

        let amount = money::to_minor(sum).ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidRequest, "sum out of range")
        })?;
        if amount <= 0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "sum must be positive",
            ));
        }

        let order_exists = self
            .store
            .order_number_exists(order_number)
            .await
            .map_err(|err| classify(err, Operation::Withdraw))?;
        if !order_exists {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }

        match self
            .store
            .execute_withdrawal(user_id, order_number, amount)
            .await
            .map_err(|err| classify(err, Operation::Withdraw))?
        {
            crate::store::WithdrawalAttempt::Completed(withdrawal) => Ok(withdrawal),
            crate::store::WithdrawalAttempt::InsufficientFunds => {
                Err(AppError::new(ErrorCode::InsufficientFunds))
            }
        }
    }

    /// The user's withdrawals, oldest first.
    pub async fn withdrawals(&self, user_id: Uuid) -> Result<Vec<Withdrawal>, AppError> {
        self.store
            .withdrawals_for_user(user_id)
            .await
            .map_err(|err| classify(err, Operation::ListWithdrawals))
    }
}
