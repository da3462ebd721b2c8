//! Notification and push dispatch models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// `None` for broadcasts
    pub user_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    pub user_id: Option<Uuid>,
    /// Also deliver through the messaging provider
    #[serde(default)]
    pub push: bool,
}

/// Push dispatch to every device subscribed to a topic
#[derive(Debug, Clone, Deserialize)]
pub struct TopicPushRequest {
    pub topic: String,
    pub title: String,
    pub body: String,
}

/// Push dispatch to one user's device
#[derive(Debug, Clone, Deserialize)]
pub struct DevicePushRequest {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub delivered: bool,
}
