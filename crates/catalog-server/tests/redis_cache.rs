//! Shared tier selection and the Redis hash layout.
//!
//! Container tests require Docker: `cargo test -p catalog-server -- --ignored`.

use catalog_server::cache::{ALL_PRODUCTS, CacheError, EntryOptions, SharedCache};
use catalog_server::{RedisConfig, create_shared_cache};
use redis::AsyncCommands;
use std::time::Duration;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::{REDIS_PORT, Redis};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn disabled_redis_uses_in_process_tier() {
    let cache = create_shared_cache(&RedisConfig::default()).await;
    assert_eq!(cache.backend_name(), "memory");
}

#[tokio::test]
async fn unreachable_redis_falls_back() {
    let config = RedisConfig {
        enabled: true,
        url: "redis://127.0.0.1:1".into(),
        timeout_ms: 200,
        ..RedisConfig::default()
    };
    let cache = create_shared_cache(&config).await;
    assert_eq!(cache.backend_name(), "memory");
}

async fn start_redis() -> (ContainerAsync<Redis>, String) {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start Redis container");
    let port = container
        .get_host_port_ipv4(REDIS_PORT)
        .await
        .expect("Failed to get port");
    (container, format!("redis://127.0.0.1:{port}"))
}

fn redis_config(url: &str, instance_name: &str) -> RedisConfig {
    RedisConfig {
        enabled: true,
        url: url.to_string(),
        instance_name: instance_name.to_string(),
        ..RedisConfig::default()
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn set_get_remove_round_trip() {
    let (_container, url) = start_redis().await;
    let cache = create_shared_cache(&redis_config(&url, "")).await;
    assert_eq!(cache.backend_name(), "redis");

    let cancel = CancellationToken::new();
    let options = EntryOptions::new(Duration::from_secs(600), Duration::from_secs(300));

    assert_eq!(cache.get("missing", &cancel).await.unwrap(), None);

    cache
        .set(ALL_PRODUCTS, b"[]".to_vec(), &options, &cancel)
        .await
        .expect("set");
    assert_eq!(
        cache.get(ALL_PRODUCTS, &cancel).await.expect("get"),
        Some(b"[]".to_vec())
    );

    cache.remove(ALL_PRODUCTS, &cancel).await.expect("remove");
    cache.remove(ALL_PRODUCTS, &cancel).await.expect("remove is idempotent");
    assert_eq!(cache.get(ALL_PRODUCTS, &cancel).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn keys_carry_instance_prefix_and_ttl() {
    let (_container, url) = start_redis().await;
    let cache = create_shared_cache(&redis_config(&url, "CacheDemo_")).await;
    let cancel = CancellationToken::new();
    let options = EntryOptions::new(Duration::from_secs(600), Duration::from_secs(300));

    cache
        .set(ALL_PRODUCTS, b"payload".to_vec(), &options, &cancel)
        .await
        .expect("set");

    let client = redis::Client::open(url.as_str()).expect("client");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("connect");

    let prefixed: bool = conn.exists("CacheDemo_all-products").await.unwrap();
    let bare: bool = conn.exists(ALL_PRODUCTS).await.unwrap();
    assert!(prefixed);
    assert!(!bare);

    let data: Vec<u8> = conn.hget("CacheDemo_all-products", "data").await.unwrap();
    assert_eq!(data, b"payload");
    let sliding: i64 = conn.hget("CacheDemo_all-products", "sldexp").await.unwrap();
    assert_eq!(sliding, 300_000);

    // Deadlines are unix milliseconds.
    let absolute: i64 = conn.hget("CacheDemo_all-products", "absexp").await.unwrap();
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    assert!(absolute > now_ms && absolute <= now_ms + 600_000, "absexp {absolute}");

    // TTL is bounded by the sliding window.
    let ttl: i64 = conn.pttl("CacheDemo_all-products").await.unwrap();
    assert!(ttl > 0 && ttl <= 300_000, "ttl {ttl}");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn cancelled_token_short_circuits() {
    let (_container, url) = start_redis().await;
    let cache = create_shared_cache(&redis_config(&url, "")).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = cache.get(ALL_PRODUCTS, &cancel).await.unwrap_err();
    assert!(matches!(err, CacheError::Cancelled));
}
