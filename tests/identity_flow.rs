//! Registration, login and cached identity resolution.

mod support;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use pointsmart::error::ErrorCode;
use pointsmart::service::Service;
use pointsmart::store::UserCache;

use support::{FailingCache, MemoryCache, MemoryStore};

#[tokio::test]
async fn register_creates_an_account_with_a_zero_balance() {
    let store = Arc::new(MemoryStore::new());
    let service = Service::new(store.clone(), Arc::new(MemoryCache::new()));

    let user = service.register("alice", "s3cret-pass").await.unwrap();
    assert_eq!(user.login, "alice");
    // The hash is never the raw password.
    assert_ne!(user.password_hash, "s3cret-pass");

    assert_eq!(store.balance_of(user.id), (0, 0));
}

#[tokio::test]
async fn duplicate_login_is_a_conflict() {
    let store = Arc::new(MemoryStore::new());
    let service = Service::new(store, Arc::new(MemoryCache::new()));

    service.register("alice", "s3cret-pass").await.unwrap();
    let err = service.register("alice", "other-pass").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::LoginInUse);
}

#[tokio::test]
async fn login_verifies_credentials() {
    let store = Arc::new(MemoryStore::new());
    let service = Service::new(store, Arc::new(MemoryCache::new()));

    let registered = service.register("alice", "s3cret-pass").await.unwrap();

    let user = service.login("alice", "s3cret-pass").await.unwrap();
    assert_eq!(user.id, registered.id);

    let err = service.login("alice", "wrong-pass").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidCredentials);

    let err = service.login("nobody", "s3cret-pass").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UserNotFound);
}

#[tokio::test]
async fn identity_resolution_populates_the_cache() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let service = Service::new(store.clone(), cache.clone());
    let user = store.seed_user("alice");

    assert!(!cache.contains(user.id));
    let resolved = service.user_by_id(user.id).await.unwrap();
    assert_eq!(resolved.id, user.id);
    assert!(cache.contains(user.id));
}

#[tokio::test]
async fn fresh_cache_entries_are_served_without_a_store_read() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let service = Service::new(store.clone(), cache.clone());

    // Cached identity that the store has never seen. If resolution went to
    // the store first, this lookup would fail.
    let cached_only = pointsmart::model::User {
        id: Uuid::new_v4(),
        login: "cached-only".to_string(),
        password_hash: String::new(),
        created_at: chrono::Utc::now(),
    };
    cache
        .set(cached_only.id, &cached_only, Duration::from_secs(600))
        .await
        .unwrap();

    let resolved = service.user_by_id(cached_only.id).await.unwrap();
    assert_eq!(resolved.id, cached_only.id);
}

#[tokio::test]
async fn expired_cache_entries_fall_back_to_the_store() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let service = Service::new(store.clone(), cache.clone());
    let user = store.seed_user("alice");

    // Stale entry with a different login than the store holds.
    let mut stale = user.clone();
    stale.login = "stale-alice".to_string();
    cache.set(user.id, &stale, Duration::ZERO).await.unwrap();

    let resolved = service.user_by_id(user.id).await.unwrap();
    assert_eq!(resolved.login, "alice");

    // The miss repopulated the cache with the store's copy.
    let repopulated = cache.get(user.id).await.unwrap();
    assert_eq!(repopulated.map(|u| u.login), Some("alice".to_string()));
}

#[tokio::test]
async fn cache_failures_degrade_to_store_reads() {
    let store = Arc::new(MemoryStore::new());
    let service = Service::new(store.clone(), Arc::new(FailingCache));
    let user = store.seed_user("alice");

    let resolved = service.user_by_id(user.id).await.unwrap();
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn unknown_user_id_is_unauthorized() {
    let store = Arc::new(MemoryStore::new());
    let service = Service::new(store, Arc::new(MemoryCache::new()));

    let err = service.user_by_id(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);
}
