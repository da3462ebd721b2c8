//! Administrative backend for the coin/rewards platform.
//!
//! Users move through a verification lifecycle, belong to levels and earn
//! coins recorded in an append-only ledger. Balances are always derived
//! from the ledger. Staff manage all of it over a JSON REST API.

use sqlx::migrate::Migrator;

pub mod columns;
pub mod config;
pub mod error;
pub mod extractors;
pub mod hashing;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod rate_limiter;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use state::AppState;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
