//! Transaction and coin routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    error::ApiResult,
    extractors::{ApiJson, ApiQuery},
    middleware::AuthUser,
    models::{
        CategoryBalance, CoinAdjustment, EditCoinsRequest, LedgerEntry, LedgerQuery,
        NewLedgerEntry, UserCoinTotal, UserLedger,
    },
    response::{Envelope, PageQuery, Paginated},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(user_transactions).post(add_transaction))
        .route("/transactions/category", get(category_balances))
        .route("/transactions/paginated", get(paginated_transactions))
        .route("/coins", get(coin_totals))
        .route("/coins/edit", put(edit_coins))
}

pub async fn add_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<NewLedgerEntry>,
) -> ApiResult<Envelope<LedgerEntry>> {
    let entry = state.balances.record(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Transaction recorded", entry).with_status(StatusCode::CREATED))
}

pub async fn user_transactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LedgerQuery>,
) -> ApiResult<Envelope<UserLedger>> {
    let ledger = state.balances.user_ledger(query.user_id).await?;
    Ok(Envelope::panel("Transactions fetched", ledger))
}

pub async fn category_balances(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LedgerQuery>,
) -> ApiResult<Envelope<Vec<CategoryBalance>>> {
    let balances = state.balances.per_category(query.user_id).await?;
    Ok(Envelope::panel("Category balances fetched", balances))
}

pub async fn paginated_transactions(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<LedgerEntry>>> {
    let entries = state.balances.ledger_page(&page).await?;
    Ok(Envelope::panel("Transactions fetched", entries))
}

pub async fn coin_totals(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<UserCoinTotal>>> {
    let totals = state.balances.user_totals(&page).await?;
    Ok(Envelope::panel("Coin totals fetched", totals))
}

pub async fn edit_coins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<EditCoinsRequest>,
) -> ApiResult<Envelope<CoinAdjustment>> {
    let adjustment = state.balances.edit_balance(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Coins updated", adjustment))
}
