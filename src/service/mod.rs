//! Core service layer: order intake, balance ledger, identity resolution.
//!
//! Every operation takes the acting user id as an explicit parameter and
//! returns a classified outcome; raw storage errors stop at this layer.

mod balance;
mod classify;
mod orders;
mod users;

pub use balance::BalanceView;
pub use classify::{Operation, classify};
pub use orders::SubmitOutcome;

use std::sync::Arc;
use std::time::Duration;

use crate::store::{Store, UserCache};

/// TTL applied when populating the identity cache on a read-through miss.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
pub struct Service {
    store: Arc<dyn Store>,
    cache: Arc<dyn UserCache>,
}

impl Service {
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn UserCache>) -> Self {
        Self { store, cache }
    }
}
