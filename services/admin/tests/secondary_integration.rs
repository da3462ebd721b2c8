//! Staff, verification sessions and templates against PostgreSQL
//!
//! Skipped when `DATABASE_URL` is not set.

mod support;

use admin::{
    error::ApiError,
    hashing::{hash_secret, verify_secret},
    models::{NewRole, NewStaff, StaffStatus, TfaStatus, UpdateStaff, VerifyCodeRequest},
    repositories::{RoleRepository, StaffRepository, TemplateRepository, TfaRepository},
    services::tfa::CODE_TEMPLATE,
};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use support::{end_user, fixture};

#[tokio::test]
async fn test_role_with_staff_cannot_be_deleted() {
    let Some(fx) = fixture().await else { return };
    let roles = RoleRepository::new(fx.pool.clone());
    let staff = StaffRepository::new(fx.pool.clone());

    let role = roles
        .create(&NewRole {
            name: format!("support-{}", Uuid::new_v4()),
            acl: HashMap::from([("users".to_string(), true)]),
        })
        .await
        .unwrap();
    assert_eq!(role.acl.0.get("users"), Some(&true));

    let member = staff
        .create(&NewStaff {
            name: "Grace".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password: "Secret123".to_string(),
            role_id: role.id,
        })
        .await
        .unwrap();
    assert_eq!(member.status, StaffStatus::Active);
    assert!(verify_secret("Secret123", &member.password_hash).unwrap());

    assert!(!roles.delete_if_unused(role.id).await.unwrap());
    assert_eq!(roles.count_staff(role.id).await.unwrap(), 1);

    let updated = staff
        .update(
            member.id,
            &UpdateStaff {
                status: Some(StaffStatus::Inactive),
                ..UpdateStaff::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, StaffStatus::Inactive);
    assert_eq!(updated.password_hash, member.password_hash);

    assert!(staff.delete(member.id).await.unwrap());
    assert!(roles.delete_if_unused(role.id).await.unwrap());
}

#[tokio::test]
async fn test_tfa_session_validates_once_and_only_before_expiry() {
    let Some(fx) = fixture().await else { return };
    let sessions = TfaRepository::new(fx.pool.clone());
    let user = fx.user("Two Factor").await;

    let hash = hash_secret("123456").unwrap();
    let live = sessions
        .create(user.id, &hash, Utc::now() + Duration::minutes(10))
        .await
        .unwrap();
    assert_eq!(live.status, TfaStatus::Pending);

    let validated = sessions.mark_validated(live.id).await.unwrap().unwrap();
    assert_eq!(validated.status, TfaStatus::Validated);
    assert!(validated.validated_at.is_some());
    assert!(sessions.mark_validated(live.id).await.unwrap().is_none());

    let expired = sessions
        .create(user.id, &hash, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();
    assert!(sessions.mark_validated(expired.id).await.unwrap().is_none());
    let stored = sessions.find_by_id(expired.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TfaStatus::Pending);
}

#[tokio::test]
async fn test_code_template_is_seeded() {
    let Some(fx) = fixture().await else { return };
    let templates = TemplateRepository::new(fx.pool.clone());

    let template = templates.find_by_name(CODE_TEMPLATE).await.unwrap().unwrap();
    let rendered = template.render(&HashMap::from([
        ("name", "Ada".to_string()),
        ("code", "042917".to_string()),
        ("minutes", "10".to_string()),
    ]));
    assert!(rendered.body.contains("042917"));
    assert!(rendered.body.contains("Ada"));
    assert!(!rendered.body.contains("{{"));
}

#[tokio::test]
async fn test_only_the_owner_verifies_a_session() {
    let Some(fx) = fixture().await else { return };
    let tfa = fx.tfa(2);
    let sessions = TfaRepository::new(fx.pool.clone());
    let owner = fx.user("Session Owner").await;
    let other = fx.user("Someone Else").await;

    let session = sessions
        .create(
            owner.id,
            &hash_secret("654321").unwrap(),
            Utc::now() + Duration::minutes(10),
        )
        .await
        .unwrap();

    // More foreign attempts than the owner's budget allows
    for code in ["000000", "111111", "654321"] {
        let request = VerifyCodeRequest {
            session_id: session.id,
            code: code.to_string(),
        };
        assert!(matches!(
            tfa.verify_code(&end_user(other.id), &request).await,
            Err(ApiError::Forbidden)
        ));
    }

    let stored = sessions.find_by_id(session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TfaStatus::Pending);

    let request = VerifyCodeRequest {
        session_id: session.id,
        code: "654321".to_string(),
    };
    let validated = tfa.verify_code(&end_user(owner.id), &request).await.unwrap();
    assert_eq!(validated.status, TfaStatus::Validated);
}
