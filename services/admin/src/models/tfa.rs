//! Two-factor email verification session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TfaStatus {
    Pending,
    Validated,
}

impl TfaStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Validated => "VALIDATED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(Self::Pending),
            "VALIDATED" => Some(Self::Validated),
            _ => None,
        }
    }
}

impl fmt::Display for TfaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TfaSession {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub code_hash: String,
    pub status: TfaStatus,
    pub expires_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TfaSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendCodeRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeRequest {
    pub session_id: Uuid,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TfaIssued {
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub delivered: bool,
}
