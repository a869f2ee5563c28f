use chrono::Utc;
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use santa_domain::admin::AuthProvider;

use crate::domain::repository::{
    AdminRepository, AuditRepository, OwnerClaimRepository, PendingClaimCache,
};
use crate::domain::types::{AdminUser, CLAIM_CODE_LEN, PendingIdentity, ProviderProfile};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

/// Uppercase alphanumeric, so the code is easy to read aloud and type.
const CLAIM_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_claim_code() -> String {
    let mut rng = rand::rng();
    (0..CLAIM_CODE_LEN)
        .map(|_| CLAIM_CHARSET[rng.random_range(0..CLAIM_CHARSET.len())] as char)
        .collect()
}

/// Opaque handle the browser holds while a claim is pending.
fn generate_claim_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Result of an identity-provider sign-in.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Known administrator; start a session.
    Admin(AdminUser),
    /// No administrators exist yet; the identity may claim ownership.
    PendingClaim { claim_id: String },
}

/// One-time promotion of the first identity to system owner.
///
/// `NoOwnerYet → ClaimPending` on the first sign-in with zero admins,
/// `ClaimPending → Owned` on a matching claim code. Once any admin exists the
/// first state is unreachable.
pub struct OwnershipBootstrap<D, O, C, A>
where
    D: AdminRepository,
    O: OwnerClaimRepository,
    C: PendingClaimCache,
    A: AuditRepository,
{
    pub admins: D,
    pub claims: O,
    pub pending: C,
    pub audit: AuditRecorder<A>,
}

impl<D, O, C, A> OwnershipBootstrap<D, O, C, A>
where
    D: AdminRepository,
    O: OwnerClaimRepository,
    C: PendingClaimCache,
    A: AuditRepository,
{
    pub async fn sign_in(
        &self,
        provider: AuthProvider,
        profile: ProviderProfile,
    ) -> Result<SignInOutcome, ExchangeServiceError> {
        if let Some(admin) = self
            .admins
            .find_by_provider_identity(provider, &profile.id)
            .await?
        {
            return Ok(SignInOutcome::Admin(admin));
        }

        // An approved admin signing in for the first time is matched by email.
        if let Some(email) = profile.email.as_deref().map(str::to_lowercase) {
            if let Some(mut admin) = self.admins.find_by_email(provider, &email).await? {
                if admin.provider_user_id.is_none() {
                    self.admins.link_identity(admin.id, &profile).await?;
                    admin.provider_user_id = Some(profile.id.clone());
                    admin.username = profile.username.clone();
                    tracing::info!(admin_id = %admin.id, %provider, "linked admin identity");
                    return Ok(SignInOutcome::Admin(admin));
                }
            }
        }

        if self.admins.count().await? > 0 {
            tracing::info!(%provider, provider_user_id = %profile.id, "rejected unapproved sign-in");
            return Err(ExchangeServiceError::NotAnApprovedAdmin);
        }

        let code = generate_claim_code();
        if self.claims.create_if_absent(&code).await? {
            // Operator channel only; never part of an HTTP response.
            tracing::warn!(
                target: "santa::owner_claim",
                claim_code = %code,
                "no administrators exist; enter this code to claim system ownership"
            );
        }

        let claim_id = generate_claim_id();
        self.pending
            .put(&claim_id, &PendingIdentity { provider, profile })
            .await?;
        Ok(SignInOutcome::PendingClaim { claim_id })
    }

    /// Exactly one concurrent caller with the right code wins; the others see
    /// `InvalidClaimCode` because the code is already consumed.
    pub async fn claim(
        &self,
        claim_id: &str,
        code: &str,
    ) -> Result<AdminUser, ExchangeServiceError> {
        let identity = self
            .pending
            .get(claim_id)
            .await?
            .ok_or(ExchangeServiceError::ClaimWindowExpired)?;

        let owner = AdminUser {
            id: Uuid::new_v4(),
            provider: identity.provider,
            provider_user_id: Some(identity.profile.id.clone()),
            email: identity.profile.email.as_deref().map(str::to_lowercase),
            username: identity.profile.username.clone(),
            is_system_owner: true,
            created_at: Utc::now(),
        };

        let normalized = code.trim().to_uppercase();
        if !self.claims.consume(&normalized, &owner).await? {
            return Err(ExchangeServiceError::InvalidClaimCode);
        }

        if let Err(e) = self.pending.remove(claim_id).await {
            tracing::warn!(error = %e, "failed to drop pending claim");
        }
        tracing::info!(admin_id = %owner.id, provider = %owner.provider, "system ownership claimed");
        self.audit
            .record(
                Some(owner.id),
                "system_owner.claim",
                "admin_user",
                Some(owner.id.to_string()),
                json!({ "provider": owner.provider, "username": owner.username }),
            )
            .await;
        Ok(owner)
    }
}
