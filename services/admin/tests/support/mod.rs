//! Shared fixtures for the database-backed tests

#![allow(dead_code)]

use admin::{
    MIGRATOR,
    config::Settings,
    middleware::AuthUser,
    models::{Level, LevelFields, NewUser, User},
    notify::Mailer,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        CategoryRepository, LedgerRepository, LevelRepository, TemplateRepository, TfaRepository,
        UserRepository,
    },
    services::{BalanceService, LevelService, LifecycleService, TfaService, UserService},
};
use common::database::{DatabaseConfig, init_pool, run_migrations};
use sqlx::PgPool;
use uuid::Uuid;

/// Settings with push and mail disabled
pub fn settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        tfa_code_ttl_minutes: 10,
        tfa_max_attempts: 3,
        tfa_window_seconds: 300,
        push_endpoint: None,
        push_server_key: None,
        mail_endpoint: None,
        mail_api_key: None,
        mail_from: "no-reply@localhost".to_string(),
    }
}

/// Identity of an end user, as the auth layer injects it
pub fn end_user(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        role: None,
        status: None,
        permissions: vec![],
    }
}

/// Migrated pool, or `None` when no database is configured
pub async fn pool() -> Option<PgPool> {
    if std::env::var("DATABASE_URL").is_err() {
        return None;
    }

    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    run_migrations(&pool, &MIGRATOR).await.expect("migrations");
    Some(pool)
}

pub struct Fixture {
    pub pool: PgPool,
    pub users: UserRepository,
    pub levels: LevelRepository,
    pub ledger: LedgerRepository,
    pub categories: CategoryRepository,
    pub lifecycle: LifecycleService,
    pub user_service: UserService,
    pub level_service: LevelService,
    pub balances: BalanceService,
}

impl Fixture {
    pub fn new(pool: PgPool) -> Self {
        let users = UserRepository::new(pool.clone());
        let levels = LevelRepository::new(pool.clone());
        let ledger = LedgerRepository::new(pool.clone());
        let categories = CategoryRepository::new(pool.clone());
        let lifecycle = LifecycleService::new(users.clone());

        Self {
            user_service: UserService::new(
                users.clone(),
                levels.clone(),
                ledger.clone(),
                lifecycle.clone(),
            ),
            level_service: LevelService::new(levels.clone(), users.clone()),
            balances: BalanceService::new(ledger.clone(), users.clone(), categories.clone()),
            lifecycle,
            pool,
            users,
            levels,
            ledger,
            categories,
        }
    }

    pub async fn user(&self, name: &str) -> User {
        self.users
            .create(&NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: None,
                dob: None,
                gender: None,
                address: Some("12 Test Street".to_string()),
                push_token: None,
            })
            .await
            .expect("create user")
    }

    pub async fn level(&self, name: &str, min: i64, max: i64) -> Level {
        self.levels
            .create(
                &LevelFields {
                    name: name.to_string(),
                    level_value: 1,
                    min_thresh: min,
                    max_thresh: max,
                },
                None,
            )
            .await
            .expect("create level")
    }
}

impl Fixture {
    /// Verification service allowing `max_attempts` tries per window
    pub fn tfa(&self, max_attempts: u32) -> TfaService {
        TfaService::new(
            TfaRepository::new(self.pool.clone()),
            self.users.clone(),
            TemplateRepository::new(self.pool.clone()),
            Mailer::new(&settings()).expect("mailer"),
            RateLimiter::new(RateLimiterConfig {
                max_attempts,
                window_seconds: 300,
                ban_duration_seconds: 900,
            }),
            10,
        )
    }
}

pub async fn fixture() -> Option<Fixture> {
    pool().await.map(Fixture::new)
}
