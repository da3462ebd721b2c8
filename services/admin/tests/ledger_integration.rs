//! Ledger aggregation and coin edits against PostgreSQL
//!
//! Skipped when `DATABASE_URL` is not set.

mod support;

use admin::{
    error::ApiError,
    models::{CategoryFields, CoinType, EditCoinsRequest, NewLedgerEntry},
    response::PageQuery,
};
use uuid::Uuid;

use support::fixture;

fn entry(user_id: Uuid, coin: i64, coin_type: CoinType) -> NewLedgerEntry {
    NewLedgerEntry {
        user_id,
        coin,
        coin_type,
        category_id: None,
    }
}

#[tokio::test]
async fn test_total_balance_is_sum_of_entries() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Ledger Sum").await;

    for coin in [50, 20, -10] {
        fx.balances
            .record(&entry(user.id, coin, CoinType::Primary), None)
            .await
            .unwrap();
    }
    fx.balances
        .record(&entry(user.id, 7, CoinType::Secondary), None)
        .await
        .unwrap();

    assert_eq!(
        fx.balances.total_balance(user.id, CoinType::Primary).await.unwrap(),
        60
    );
    assert_eq!(
        fx.balances.total_balance(user.id, CoinType::Secondary).await.unwrap(),
        7
    );
}

#[tokio::test]
async fn test_total_balance_without_entries_is_zero() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("No Coins").await;

    assert_eq!(
        fx.balances.total_balance(user.id, CoinType::Primary).await.unwrap(),
        0
    );
    assert_eq!(
        fx.balances
            .total_balance(Uuid::new_v4(), CoinType::Secondary)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_record_validates_references() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Strict Ledger").await;

    assert!(matches!(
        fx.balances.record(&entry(Uuid::new_v4(), 5, CoinType::Primary), None).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        fx.balances.record(&entry(user.id, 0, CoinType::Primary), None).await,
        Err(ApiError::Validation(_))
    ));

    let mut with_category = entry(user.id, 5, CoinType::Primary);
    with_category.category_id = Some(Uuid::new_v4());
    assert!(matches!(
        fx.balances.record(&with_category, None).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_per_category_groups_entries() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Categorised").await;
    let category = fx
        .categories
        .create(
            &CategoryFields {
                name: format!("Quests {}", Uuid::new_v4()),
                image: None,
                color: Some("#112233".to_string()),
            },
            None,
        )
        .await
        .unwrap();

    for coin in [10, 15] {
        let mut e = entry(user.id, coin, CoinType::Primary);
        e.category_id = Some(category.id);
        fx.balances.record(&e, None).await.unwrap();
    }
    let mut secondary = entry(user.id, 7, CoinType::Secondary);
    secondary.category_id = Some(category.id);
    fx.balances.record(&secondary, None).await.unwrap();
    fx.balances
        .record(&entry(user.id, 3, CoinType::Primary), None)
        .await
        .unwrap();

    let balances = fx.balances.per_category(user.id).await.unwrap();
    assert_eq!(balances.len(), 3);

    let tagged = |coin_type: CoinType| {
        balances
            .iter()
            .find(|b| b.category_id == Some(category.id) && b.coin_type == coin_type)
            .unwrap()
    };
    assert_eq!(tagged(CoinType::Primary).total_coins, 25);
    assert_eq!(tagged(CoinType::Primary).transaction_count, 2);
    // Denominations are never added together
    assert_eq!(tagged(CoinType::Secondary).total_coins, 7);
    assert_eq!(tagged(CoinType::Secondary).transaction_count, 1);

    let untagged = balances.iter().find(|b| b.category_id.is_none()).unwrap();
    assert_eq!(untagged.coin_type, CoinType::Primary);
    assert_eq!(untagged.total_coins, 3);
    assert_eq!(untagged.transaction_count, 1);

    // Referenced categories cannot be deleted
    assert!(!fx.categories.delete_if_unused(category.id).await.unwrap());
    assert_eq!(fx.categories.count_entries(category.id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_edit_balance_appends_adjustment() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Adjusted").await;
    fx.balances
        .record(&entry(user.id, 40, CoinType::Secondary), None)
        .await
        .unwrap();

    let request = EditCoinsRequest {
        user_id: user.id,
        coin_type: CoinType::Secondary,
        new_coin_value: 25,
    };
    let adjustment = fx.balances.edit_balance(&request, None).await.unwrap();
    assert_eq!(adjustment.previous_balance, 40);
    assert_eq!(adjustment.new_balance, 25);
    assert_eq!(adjustment.entry.as_ref().unwrap().coin, -15);

    // Setting the current value again appends nothing
    let unchanged = fx.balances.edit_balance(&request, None).await.unwrap();
    assert!(unchanged.entry.is_none());

    let ledger = fx.balances.user_ledger(user.id).await.unwrap();
    assert_eq!(ledger.entries.len(), 2);
    assert_eq!(ledger.balances.secondary, 25);
    assert_eq!(ledger.balances.primary, 0);

    let missing = EditCoinsRequest {
        user_id: Uuid::new_v4(),
        ..request
    };
    assert!(matches!(
        fx.balances.edit_balance(&missing, None).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_edits_converge() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Contended").await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let balances = fx.balances.clone();
        let request = EditCoinsRequest {
            user_id: user.id,
            coin_type: CoinType::Primary,
            new_coin_value: 100,
        };
        handles.push(tokio::spawn(async move {
            balances.edit_balance(&request, None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        fx.balances.total_balance(user.id, CoinType::Primary).await.unwrap(),
        100
    );
}

#[tokio::test]
async fn test_user_totals_are_ordered_and_paged() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Reported").await;
    fx.balances
        .record(&entry(user.id, 5, CoinType::Primary), None)
        .await
        .unwrap();
    fx.balances
        .record(&entry(user.id, 40, CoinType::Secondary), None)
        .await
        .unwrap();

    let page = fx.balances.user_totals(&PageQuery::new(1, 10)).await.unwrap();
    assert!(page.items.len() <= 10);
    assert!(page.total >= 1);
    assert_eq!(page.total_pages, (page.total + 9) / 10);
    assert!(page.items.windows(2).all(|pair| {
        let (a, b) = (pair[0].total_coins, pair[1].total_coins);
        (a.primary, a.secondary) >= (b.primary, b.secondary)
    }));

    // Walk the pages until the user shows up with split balances
    let mut found = None;
    for number in 1..=page.total_pages.max(1) {
        let page = fx
            .balances
            .user_totals(&PageQuery::new(number as u32, 10))
            .await
            .unwrap();
        if let Some(row) = page.items.into_iter().find(|row| row.user_id == user.id) {
            found = Some(row);
            break;
        }
    }
    let row = found.expect("user listed in totals");
    assert_eq!(row.total_coins.primary, 5);
    assert_eq!(row.total_coins.secondary, 40);
}
