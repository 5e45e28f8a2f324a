//! Application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::service::Service;
use crate::store::postgres::PgStore;
use crate::store::redis_cache::RedisUserCache;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Core service layer (order intake, ledger, identity)
    pub service: Service,
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT issuer claim
    pub jwt_issuer: String,
    /// Access token lifetime in hours
    pub jwt_ttl_hours: i64,
}

impl AppState {
    /// Create a new AppState: connect the pool, run migrations, connect the
    /// cache.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");

        // The connection manager reconnects on its own after transient
        // failures; at runtime every cache error degrades to a store read.
        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let cache_conn = redis_client.get_connection_manager().await?;

        let service = Service::new(
            Arc::new(PgStore::new(pool)),
            Arc::new(RedisUserCache::new(cache_conn)),
        );

        Ok(Self {
            service,
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.jwt_issuer.clone(),
            jwt_ttl_hours: config.jwt_ttl_hours,
        })
    }
}
