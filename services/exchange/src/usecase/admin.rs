use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_session::identity::AdminIdentity;

use crate::domain::repository::{AdminRepository, AuditRepository};
use crate::domain::types::AdminUser;
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

// ── GetSessionAdmin ──────────────────────────────────────────────────────────

pub struct GetAdminUseCase<D: AdminRepository> {
    pub admins: D,
}

impl<D: AdminRepository> GetAdminUseCase<D> {
    /// A session for a deleted admin is treated as signed out.
    pub async fn execute(&self, admin_id: Uuid) -> Result<AdminUser, ExchangeServiceError> {
        self.admins
            .find_by_id(admin_id)
            .await?
            .ok_or(ExchangeServiceError::Unauthorized)
    }
}

// ── ApproveAdmin (owner only) ────────────────────────────────────────────────

pub struct ApproveAdminInput {
    pub provider: AuthProvider,
    pub email: String,
}

pub struct ApproveAdminUseCase<D: AdminRepository, A: AuditRepository> {
    pub admins: D,
    pub audit: AuditRecorder<A>,
}

impl<D: AdminRepository, A: AuditRepository> ApproveAdminUseCase<D, A> {
    pub async fn execute(
        &self,
        actor: AdminIdentity,
        input: ApproveAdminInput,
    ) -> Result<AdminUser, ExchangeServiceError> {
        if !actor.is_system_owner {
            return Err(ExchangeServiceError::Forbidden);
        }
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ExchangeServiceError::InvalidRequest("a valid email is required"));
        }
        if let Some(existing) = self.admins.find_by_email(input.provider, &email).await? {
            return Ok(existing);
        }

        let admin = AdminUser {
            id: Uuid::new_v4(),
            provider: input.provider,
            provider_user_id: None,
            email: Some(email.clone()),
            username: email,
            is_system_owner: false,
            created_at: Utc::now(),
        };
        self.admins.create(&admin).await?;

        self.audit
            .record(
                Some(actor.admin_id),
                "admin.approve",
                "admin_user",
                Some(admin.id.to_string()),
                json!({ "provider": admin.provider, "email": admin.email }),
            )
            .await;
        Ok(admin)
    }
}

// ── ListAdmins (owner only) ──────────────────────────────────────────────────

pub struct ListAdminsUseCase<D: AdminRepository> {
    pub admins: D,
}

impl<D: AdminRepository> ListAdminsUseCase<D> {
    pub async fn execute(
        &self,
        actor: AdminIdentity,
    ) -> Result<Vec<AdminUser>, ExchangeServiceError> {
        if !actor.is_system_owner {
            return Err(ExchangeServiceError::Forbidden);
        }
        self.admins.list().await
    }
}
