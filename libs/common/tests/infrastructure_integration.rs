//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL and Redis are reachable with the
//! configuration the admin service uses. They are skipped when the
//! corresponding `DATABASE_URL` / `REDIS_URL` variables are not set.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use sqlx::Row;

#[tokio::test]
async fn test_postgres_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(());
    }

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT COALESCE(SUM(x), 0)::BIGINT AS total FROM (VALUES (50), (20), (-10)) AS t(x)")
        .fetch_one(&pool)
        .await?;
    let total: i64 = row.get("total");
    assert_eq!(total, 60, "PostgreSQL aggregate query test failed");

    Ok(())
}

#[tokio::test]
async fn test_redis_revocation_list() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("REDIS_URL").is_err() {
        return Ok(());
    }

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let token = format!("integration_test_token_{}", std::process::id());
    assert!(!redis_pool.is_token_revoked(&token).await?);

    // A zero TTL is raised to one second
    redis_pool.revoke_token(&token, 0).await?;
    assert!(redis_pool.is_token_revoked(&token).await?);

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert!(!redis_pool.is_token_revoked(&token).await?);

    Ok(())
}
