//! Document upload models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registers an uploaded document path on a user
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub user_id: Uuid,
    pub doc_type: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDocuments {
    pub user_id: Uuid,
    pub documents: serde_json::Value,
    #[serde(rename = "statusChanged")]
    pub status_changed: bool,
}
