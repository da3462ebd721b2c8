//! Application state shared across handlers

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::{
    config::Settings,
    middleware::JwtVerifier,
    notify::{Mailer, NotifyError, PushClient},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        CategoryRepository, LedgerRepository, LevelRepository, NotificationRepository,
        RoleRepository, SliderRepository, StaffRepository, TemplateRepository, TfaRepository,
        UserRepository,
    },
    services::{BalanceService, LevelService, LifecycleService, TfaService, UserService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis: RedisPool,
    pub verifier: JwtVerifier,
    pub users: UserService,
    pub lifecycle: LifecycleService,
    pub levels: LevelService,
    pub balances: BalanceService,
    pub tfa: TfaService,
    pub categories: CategoryRepository,
    pub roles: RoleRepository,
    pub staff: StaffRepository,
    pub notifications: NotificationRepository,
    pub sliders: SliderRepository,
    pub templates: TemplateRepository,
    pub push: PushClient,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(
        db_pool: PgPool,
        redis: RedisPool,
        verifier: JwtVerifier,
        settings: &Settings,
    ) -> Result<Self, NotifyError> {
        let user_repository = UserRepository::new(db_pool.clone());
        let level_repository = LevelRepository::new(db_pool.clone());
        let ledger_repository = LedgerRepository::new(db_pool.clone());
        let categories = CategoryRepository::new(db_pool.clone());
        let templates = TemplateRepository::new(db_pool.clone());

        let lifecycle = LifecycleService::new(user_repository.clone());
        let users = UserService::new(
            user_repository.clone(),
            level_repository.clone(),
            ledger_repository.clone(),
            lifecycle.clone(),
        );
        let levels = LevelService::new(level_repository, user_repository.clone());
        let balances = BalanceService::new(
            ledger_repository,
            user_repository.clone(),
            categories.clone(),
        );
        let tfa = TfaService::new(
            TfaRepository::new(db_pool.clone()),
            user_repository,
            templates.clone(),
            Mailer::new(settings)?,
            RateLimiter::new(RateLimiterConfig::from(settings)),
            settings.tfa_code_ttl_minutes,
        );

        Ok(Self {
            redis,
            verifier,
            users,
            lifecycle,
            levels,
            balances,
            tfa,
            categories,
            roles: RoleRepository::new(db_pool.clone()),
            staff: StaffRepository::new(db_pool.clone()),
            notifications: NotificationRepository::new(db_pool.clone()),
            sliders: SliderRepository::new(db_pool.clone()),
            templates,
            push: PushClient::new(settings)?,
            db_pool,
        })
    }
}
