//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub color: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Category create/update payload
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFields {
    pub name: String,
    pub image: Option<String>,
    pub color: Option<String>,
}
