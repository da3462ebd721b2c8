//! Balance aggregation over the ledger
//!
//! Balances are never stored. Every figure here is recomputed from the
//! ledger entries on each call.

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CategoryBalance, CoinAdjustment, CoinType, EditCoinsRequest, LedgerEntry, NewLedgerEntry,
        UserCoinTotal, UserLedger,
    },
    repositories::{CategoryRepository, LedgerRepository, UserRepository},
    response::{PageQuery, Paginated},
};

#[derive(Clone)]
pub struct BalanceService {
    ledger: LedgerRepository,
    users: UserRepository,
    categories: CategoryRepository,
}

impl BalanceService {
    pub fn new(
        ledger: LedgerRepository,
        users: UserRepository,
        categories: CategoryRepository,
    ) -> Self {
        Self {
            ledger,
            users,
            categories,
        }
    }

    pub async fn total_balance(&self, user_id: Uuid, coin_type: CoinType) -> ApiResult<i64> {
        self.ledger.total_balance(user_id, coin_type).await
    }

    pub async fn per_category(&self, user_id: Uuid) -> ApiResult<Vec<CategoryBalance>> {
        self.ledger.per_category(user_id).await
    }

    pub async fn user_totals(&self, page: &PageQuery) -> ApiResult<Paginated<UserCoinTotal>> {
        let (items, total) = self.ledger.user_totals(page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn ledger_page(&self, page: &PageQuery) -> ApiResult<Paginated<LedgerEntry>> {
        let (items, total) = self.ledger.list(page).await?;
        Ok(Paginated::new(items, page, total))
    }

    /// All entries of a user together with both balances
    pub async fn user_ledger(&self, user_id: Uuid) -> ApiResult<UserLedger> {
        if !self.users.exists(user_id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let entries = self.ledger.list_for_user(user_id).await?;
        let balances = self.ledger.balances(user_id).await?;
        Ok(UserLedger { entries, balances })
    }

    /// Append a credit or debit
    pub async fn record(
        &self,
        entry: &NewLedgerEntry,
        actor: Option<Uuid>,
    ) -> ApiResult<LedgerEntry> {
        if entry.coin == 0 {
            return Err(ApiError::Validation("coin must not be zero".to_string()));
        }
        if !self.users.exists(entry.user_id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        if let Some(category_id) = entry.category_id {
            if !self.categories.exists(category_id).await? {
                return Err(ApiError::NotFound("Category not found".to_string()));
            }
        }

        self.ledger.append(entry, actor).await
    }

    /// Set a balance by appending the difference as one adjustment entry
    pub async fn edit_balance(
        &self,
        request: &EditCoinsRequest,
        actor: Option<Uuid>,
    ) -> ApiResult<CoinAdjustment> {
        self.ledger
            .adjust_balance(
                request.user_id,
                request.coin_type,
                request.new_coin_value,
                actor,
            )
            .await
    }
}
