//! Role and staff models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Role entity; `acl` maps permission names to grants
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub acl: Json<HashMap<String, bool>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New role creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub acl: HashMap<String, bool>,
}

/// Role update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub acl: Option<HashMap<String, bool>>,
}

/// Permission a role grants; each guards one group of staff routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Users,
    Levels,
    Coins,
    Categories,
    Staff,
    Notifications,
    Sliders,
    Templates,
    Documents,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::Users,
        Permission::Levels,
        Permission::Coins,
        Permission::Categories,
        Permission::Staff,
        Permission::Notifications,
        Permission::Sliders,
        Permission::Templates,
        Permission::Documents,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Levels => "levels",
            Self::Coins => "coins",
            Self::Categories => "categories",
            Self::Staff => "staff",
            Self::Notifications => "notifications",
            Self::Sliders => "sliders",
            Self::Templates => "templates",
            Self::Documents => "documents",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == code)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff member; the password hash never leaves the service
#[derive(Debug, Clone, Serialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: StaffStatus,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New staff creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: Uuid,
}

/// Staff update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateStaff {
    pub name: Option<String>,
    pub status: Option<StaffStatus>,
    pub role_id: Option<Uuid>,
    pub password: Option<String>,
}
