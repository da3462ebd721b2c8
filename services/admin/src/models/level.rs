//! Level model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named tier with a coin-total band
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Level {
    pub id: Uuid,
    pub name: String,
    pub level_value: i32,
    pub min_thresh: i64,
    pub max_thresh: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Mutable level fields, used for both creation and full overwrite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFields {
    pub name: String,
    pub level_value: i32,
    pub min_thresh: i64,
    pub max_thresh: i64,
}

impl LevelFields {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Level name is required".to_string());
        }
        if self.min_thresh > self.max_thresh {
            return Err(format!(
                "min_thresh ({}) must not exceed max_thresh ({})",
                self.min_thresh, self.max_thresh
            ));
        }
        Ok(())
    }
}

/// Request body for moving every user off a level
#[derive(Debug, Clone, Deserialize)]
pub struct ReassignRequest {
    pub from_level: Uuid,
    /// `None` clears the level reference
    pub to_level: Option<Uuid>,
}
