//! Ledger entry model and derived balance views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Currency denomination tracked independently per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoinType {
    Primary,
    Secondary,
}

impl CoinType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Secondary => "SECONDARY",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PRIMARY" => Some(Self::Primary),
            "SECONDARY" => Some(Self::Secondary),
            _ => None,
        }
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable coin credit (positive) or debit (negative)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coin: i64,
    pub coin_type: CoinType,
    pub category_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a ledger entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub coin: i64,
    pub coin_type: CoinType,
    pub category_id: Option<Uuid>,
}

/// Both balances of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub primary: i64,
    pub secondary: i64,
}

/// Totals of one category and coin type for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBalance {
    /// `None` groups entries without a category
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub coin_type: CoinType,
    pub total_coins: i64,
    pub transaction_count: i64,
}

/// A user and its balances across all categories
#[derive(Debug, Clone, Serialize)]
pub struct UserCoinTotal {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub total_coins: Balances,
}

/// Request body for `PUT /coins/edit`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCoinsRequest {
    pub user_id: Uuid,
    pub coin_type: CoinType,
    pub new_coin_value: i64,
}

/// Outcome of a balance edit
#[derive(Debug, Clone, Serialize)]
pub struct CoinAdjustment {
    pub previous_balance: i64,
    pub new_balance: i64,
    /// `None` when the balance already had the requested value
    pub entry: Option<LedgerEntry>,
}

/// Query parameters for ledger listings
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerQuery {
    pub user_id: Uuid,
}

/// Ledger entries of a user together with its balances
#[derive(Debug, Clone, Serialize)]
pub struct UserLedger {
    pub entries: Vec<LedgerEntry>,
    pub balances: Balances,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_type_codes() {
        assert_eq!(CoinType::from_code("PRIMARY"), Some(CoinType::Primary));
        assert_eq!(CoinType::from_code("SECONDARY"), Some(CoinType::Secondary));
        assert_eq!(CoinType::from_code("GOLD"), None);
        assert_eq!(CoinType::Secondary.to_string(), "SECONDARY");
    }

    #[test]
    fn test_edit_request_uses_camel_case() {
        let request: EditCoinsRequest = serde_json::from_value(serde_json::json!({
            "userId": "00000000-0000-0000-0000-000000000001",
            "coinType": "PRIMARY",
            "newCoinValue": 250
        }))
        .unwrap();
        assert_eq!(request.coin_type, CoinType::Primary);
        assert_eq!(request.new_coin_value, 250);
    }
}
