//! Slider model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slider {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub link: Option<String>,
    pub position: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SliderFields {
    pub title: String,
    pub image: String,
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
}
