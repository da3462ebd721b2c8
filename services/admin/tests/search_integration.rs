//! User search against PostgreSQL
//!
//! Skipped when `DATABASE_URL` is not set.

mod support;

use admin::{models::UserStatus, response::PageQuery};
use uuid::Uuid;

use support::fixture;

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

#[tokio::test]
async fn test_search_matches_any_field_case_insensitively() {
    let Some(fx) = fixture().await else { return };
    let user = fx.user("Search Candidate").await;
    fx.lifecycle
        .set_status(user.id, "VERIFIED", None)
        .await
        .unwrap();

    let page = PageQuery::new(1, 10);
    let result = fx.user_service.search("verified", &page).await.unwrap();

    assert!(result.total >= 1);
    assert_eq!(result.total_pages, (result.total + 9) / 10);
    assert!(result.items.len() <= 10);

    for found in &result.items {
        let level_name = match found.level_id {
            Some(level_id) => fx.levels.find_by_id(level_id).await.unwrap().map(|l| l.name),
            None => None,
        };
        assert!(
            contains(Some(found.status.as_str()), "verified")
                || contains(Some(found.name.as_str()), "verified")
                || contains(Some(found.email.as_str()), "verified")
                || contains(found.address.as_deref(), "verified")
                || contains(level_name.as_deref(), "verified"),
            "user {} does not match the query",
            found.id
        );
    }

    assert!(
        result
            .items
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}

#[tokio::test]
async fn test_search_by_unique_name_and_level() {
    let Some(fx) = fixture().await else { return };
    let marker = Uuid::new_v4().simple().to_string();
    let level = fx.level(&format!("Tier {}", marker), 0, 50).await;

    let named = fx.user(&format!("Named {}", marker)).await;
    let leveled = fx.user("Level Member").await;
    fx.level_service
        .update_user_level(leveled.id, level.id)
        .await
        .unwrap();

    let result = fx
        .user_service
        .search(&marker.to_uppercase(), &PageQuery::new(1, 10))
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.total_pages, 1);
    // newest first
    assert_eq!(result.items[0].id, leveled.id);
    assert_eq!(result.items[1].id, named.id);
    assert!(result.items.iter().all(|u| u.status == UserStatus::Initiated));
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let Some(fx) = fixture().await else { return };
    let result = fx
        .user_service
        .search(&format!("%_{}", Uuid::new_v4()), &PageQuery::new(1, 10))
        .await
        .unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(result.total_pages, 0);
    assert!(result.items.is_empty());
}
