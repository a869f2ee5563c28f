use santa_domain::admin::AuthProvider;
use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::admin::{
    ApproveAdminInput, ApproveAdminUseCase, GetAdminUseCase, ListAdminsUseCase,
};
use santa_session::identity::AdminIdentity;

use crate::helpers::{MockAdminRepo, MockAuditRepo, audit, test_admin};

fn identity_of(admin: &santa_exchange::domain::types::AdminUser) -> AdminIdentity {
    AdminIdentity {
        admin_id: admin.id,
        is_system_owner: admin.is_system_owner,
    }
}

#[tokio::test]
async fn should_let_owner_approve_admin_by_email() {
    let owner = test_admin(AuthProvider::Discord, "owner@example.com", true);
    let admins = MockAdminRepo::with(vec![owner.clone()]);
    let audit_repo = MockAuditRepo::default();
    let uc = ApproveAdminUseCase {
        admins: admins.clone(),
        audit: audit(&audit_repo),
    };

    let approved = uc
        .execute(
            identity_of(&owner),
            ApproveAdminInput {
                provider: AuthProvider::Google,
                email: " Friend@Example.com ".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(approved.email.as_deref(), Some("friend@example.com"));
    assert!(approved.provider_user_id.is_none());
    assert!(!approved.is_system_owner);
    assert_eq!(admins.all().len(), 2);
    assert_eq!(audit_repo.actions(), vec!["admin.approve"]);

    // Approving again returns the same record.
    let again = uc
        .execute(
            identity_of(&owner),
            ApproveAdminInput {
                provider: AuthProvider::Google,
                email: "friend@example.com".to_owned(),
            },
        )
        .await
        .unwrap();
    assert_eq!(again.id, approved.id);
    assert_eq!(admins.all().len(), 2);
}

#[tokio::test]
async fn should_forbid_non_owner_admin_operations() {
    let admin = test_admin(AuthProvider::Discord, "a@example.com", false);
    let admins = MockAdminRepo::with(vec![admin.clone()]);

    let approve = ApproveAdminUseCase {
        admins: admins.clone(),
        audit: audit(&MockAuditRepo::default()),
    }
    .execute(
        identity_of(&admin),
        ApproveAdminInput {
            provider: AuthProvider::Discord,
            email: "b@example.com".to_owned(),
        },
    )
    .await;
    assert!(matches!(approve, Err(ExchangeServiceError::Forbidden)));

    let list = ListAdminsUseCase {
        admins: admins.clone(),
    }
    .execute(identity_of(&admin))
    .await;
    assert!(matches!(list, Err(ExchangeServiceError::Forbidden)));
    assert_eq!(admins.all().len(), 1);
}

#[tokio::test]
async fn should_reject_invalid_email() {
    let owner = test_admin(AuthProvider::Discord, "owner@example.com", true);
    let result = ApproveAdminUseCase {
        admins: MockAdminRepo::with(vec![owner.clone()]),
        audit: audit(&MockAuditRepo::default()),
    }
    .execute(
        identity_of(&owner),
        ApproveAdminInput {
            provider: AuthProvider::Discord,
            email: "not-an-email".to_owned(),
        },
    )
    .await;
    assert!(matches!(result, Err(ExchangeServiceError::InvalidRequest(_))));
}

#[tokio::test]
async fn should_resolve_session_admin_or_unauthorized() {
    let admin = test_admin(AuthProvider::Google, "a@example.com", false);
    let uc = GetAdminUseCase {
        admins: MockAdminRepo::with(vec![admin.clone()]),
    };

    assert_eq!(uc.execute(admin.id).await.unwrap().id, admin.id);
    let gone = uc.execute(uuid::Uuid::new_v4()).await;
    assert!(matches!(gone, Err(ExchangeServiceError::Unauthorized)));
}
