use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use admin::{
    MIGRATOR,
    columns::verify_user_columns,
    config::{JwtConfig, Settings},
    middleware::JwtVerifier,
    routes,
    state::AppState,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting admin service");

    let settings = Settings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;
    verify_user_columns(&pool).await?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis = RedisPool::new(&redis_config).await?;

    let jwt_config = JwtConfig::from_env().map_err(anyhow::Error::msg)?;
    let verifier = JwtVerifier::new(&jwt_config)?;

    let app_state = AppState::new(pool, redis, verifier, &settings)?;

    info!("Admin service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Admin service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
