//! User model and lifecycle status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{Balances, Level};

/// Verification/moderation state of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Initiated,
    Pending,
    Verified,
    Rejected,
    Blocked,
    Deleted,
}

impl UserStatus {
    pub const ALL: [UserStatus; 6] = [
        UserStatus::Initiated,
        UserStatus::Pending,
        UserStatus::Verified,
        UserStatus::Rejected,
        UserStatus::Blocked,
        UserStatus::Deleted,
    ];

    /// Statuses an administrator may set through the permissive path
    pub const ADMIN_SETTABLE: [UserStatus; 5] = [
        UserStatus::Verified,
        UserStatus::Pending,
        UserStatus::Rejected,
        UserStatus::Blocked,
        UserStatus::Deleted,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initiated => "INITIATED",
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::Blocked => "BLOCKED",
            Self::Deleted => "DELETED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == code)
    }

    /// Parse a status an administrator is allowed to set
    pub fn admin_target(code: &str) -> Option<Self> {
        Self::from_code(code).filter(|s| Self::ADMIN_SETTABLE.contains(s))
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Edges of the strict lifecycle graph
    ///
    /// INITIATED -> PENDING -> {VERIFIED, REJECTED}; every non-terminal
    /// state may be BLOCKED; every state may be DELETED.
    pub fn can_transition_to(&self, target: UserStatus) -> bool {
        if self.is_terminal() || *self == target {
            return false;
        }
        match target {
            Self::Deleted => true,
            Self::Blocked => true,
            Self::Pending => *self == Self::Initiated,
            Self::Verified | Self::Rejected => *self == Self::Pending,
            Self::Initiated => false,
        }
    }

    /// Every status from which `target` is reachable in one step
    pub fn sources_of(target: UserStatus) -> Vec<UserStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(target))
            .collect()
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    /// Document type -> stored path
    pub documents: serde_json::Value,
    pub level_id: Option<Uuid>,
    pub status: UserStatus,
    pub push_token: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub push_token: Option<String>,
}

/// Result of a status promotion attempt
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub user: User,
    #[serde(rename = "statusChanged")]
    pub status_changed: bool,
}

/// Profile view: user, its level and derived balances
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub level: Option<Level>,
    pub balances: Balances,
}

/// Request body for status changes
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

/// Request body for level edits
#[derive(Debug, Clone, Deserialize)]
pub struct EditLevelRequest {
    pub level: Uuid,
}

/// Query parameters for user search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
