//! Ledger repository: append-only coin entries and the aggregates derived from them

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        Balances, CategoryBalance, CoinAdjustment, CoinType, LedgerEntry, NewLedgerEntry,
        UserCoinTotal,
    },
    response::PageQuery,
};

const ENTRY_FIELDS: &str = "id, user_id, coin, coin_type, category_id, created_by, created_at";

fn entry_from_row(row: &PgRow) -> ApiResult<LedgerEntry> {
    let coin_type: String = row.try_get("coin_type")?;
    let coin_type = CoinType::from_code(&coin_type)
        .ok_or_else(|| ApiError::Internal(format!("Unknown coin type in store: {}", coin_type)))?;

    Ok(LedgerEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        coin: row.try_get("coin")?,
        coin_type,
        category_id: row.try_get("category_id")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Ledger repository
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry; entries are never updated or deleted
    pub async fn append(
        &self,
        entry: &NewLedgerEntry,
        created_by: Option<Uuid>,
    ) -> ApiResult<LedgerEntry> {
        info!(
            "Appending ledger entry for user {}: {} {}",
            entry.user_id, entry.coin, entry.coin_type
        );

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ledger_entries (user_id, coin, coin_type, category_id, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENTRY_FIELDS
        ))
        .bind(entry.user_id)
        .bind(entry.coin)
        .bind(entry.coin_type.as_str())
        .bind(entry.category_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        entry_from_row(&row)
    }

    /// Sum of a user's entries of one coin type; 0 when there are none
    pub async fn total_balance(&self, user_id: Uuid, coin_type: CoinType) -> ApiResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(coin), 0)::BIGINT
            FROM ledger_entries
            WHERE user_id = $1 AND coin_type = $2
            "#,
        )
        .bind(user_id)
        .bind(coin_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Both balances of a user in one pass
    pub async fn balances(&self, user_id: Uuid) -> ApiResult<Balances> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(coin) FILTER (WHERE coin_type = 'PRIMARY'), 0)::BIGINT AS primary_total,
                   COALESCE(SUM(coin) FILTER (WHERE coin_type = 'SECONDARY'), 0)::BIGINT AS secondary_total
            FROM ledger_entries
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Balances {
            primary: row.try_get("primary_total")?,
            secondary: row.try_get("secondary_total")?,
        })
    }

    /// Totals and entry counts of a user grouped by category and coin type
    pub async fn per_category(&self, user_id: Uuid) -> ApiResult<Vec<CategoryBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT e.category_id,
                   c.name AS category_name,
                   e.coin_type,
                   COALESCE(SUM(e.coin), 0)::BIGINT AS total_coins,
                   COUNT(*) AS transaction_count
            FROM ledger_entries e
            LEFT JOIN categories c ON c.id = e.category_id
            WHERE e.user_id = $1
            GROUP BY e.category_id, c.name, e.coin_type
            ORDER BY c.name ASC NULLS LAST, e.coin_type ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> ApiResult<CategoryBalance> {
                let coin_type: String = row.try_get("coin_type")?;
                let coin_type = CoinType::from_code(&coin_type).ok_or_else(|| {
                    ApiError::Internal(format!("Unknown coin type in store: {}", coin_type))
                })?;

                Ok(CategoryBalance {
                    category_id: row.try_get("category_id")?,
                    category_name: row.try_get("category_name")?,
                    coin_type,
                    total_coins: row.try_get("total_coins")?,
                    transaction_count: row.try_get("transaction_count")?,
                })
            })
            .collect()
    }

    /// Per-user balances of each coin type across all categories
    pub async fn user_totals(&self, page: &PageQuery) -> ApiResult<(Vec<UserCoinTotal>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.name, u.email,
                   COALESCE(SUM(e.coin) FILTER (WHERE e.coin_type = 'PRIMARY'), 0)::BIGINT AS primary_total,
                   COALESCE(SUM(e.coin) FILTER (WHERE e.coin_type = 'SECONDARY'), 0)::BIGINT AS secondary_total
            FROM ledger_entries e
            JOIN users u ON u.id = e.user_id
            GROUP BY u.id, u.name, u.email
            ORDER BY primary_total DESC, secondary_total DESC, u.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;

        let totals = rows
            .iter()
            .map(|row| -> ApiResult<UserCoinTotal> {
                Ok(UserCoinTotal {
                    user_id: row.try_get("user_id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    total_coins: Balances {
                        primary: row.try_get("primary_total")?,
                        secondary: row.try_get("secondary_total")?,
                    },
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        Ok((totals, total))
    }

    /// Every entry of a user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<LedgerEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ledger_entries WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
            ENTRY_FIELDS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    /// Page through the whole ledger, newest first
    pub async fn list(&self, page: &PageQuery) -> ApiResult<(Vec<LedgerEntry>, i64)> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM ledger_entries
            ORDER BY created_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
            ENTRY_FIELDS
        ))
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;

        let entries = rows.iter().map(entry_from_row).collect::<ApiResult<Vec<_>>>()?;
        Ok((entries, total))
    }

    /// Bring a balance to `new_value` by appending the difference
    ///
    /// The user row is locked for the duration so concurrent edits of the
    /// same user apply one after the other.
    pub async fn adjust_balance(
        &self,
        user_id: Uuid,
        coin_type: CoinType,
        new_value: i64,
        created_by: Option<Uuid>,
    ) -> ApiResult<CoinAdjustment> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let previous: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(coin), 0)::BIGINT
            FROM ledger_entries
            WHERE user_id = $1 AND coin_type = $2
            "#,
        )
        .bind(user_id)
        .bind(coin_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let delta = new_value
            .checked_sub(previous)
            .ok_or_else(|| ApiError::Validation("Coin adjustment overflows".to_string()))?;

        let entry = if delta != 0 {
            let row = sqlx::query(&format!(
                r#"
                INSERT INTO ledger_entries (user_id, coin, coin_type, category_id, created_by)
                VALUES ($1, $2, $3, NULL, $4)
                RETURNING {}
                "#,
                ENTRY_FIELDS
            ))
            .bind(user_id)
            .bind(delta)
            .bind(coin_type.as_str())
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;
            Some(entry_from_row(&row)?)
        } else {
            None
        };

        tx.commit().await?;

        info!(
            "Adjusted {} balance of user {} from {} to {}",
            coin_type, user_id, previous, new_value
        );

        Ok(CoinAdjustment {
            previous_balance: previous,
            new_balance: new_value,
            entry,
        })
    }
}
