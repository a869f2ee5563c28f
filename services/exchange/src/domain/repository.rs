#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_domain::pagination::PageRequest;

use crate::domain::types::{
    AdminUser, AuditLogEntry, AuthCode, EmailMessage, Event, Pairing, Participant,
    PendingIdentity, ProviderProfile,
};
use crate::error::ExchangeServiceError;

pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<(), ExchangeServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ExchangeServiceError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Event>, ExchangeServiceError>;

    async fn update(&self, event: &Event) -> Result<(), ExchangeServiceError>;

    /// Delete an event and, by cascade, its participants, pairings and codes.
    /// Returns `false` if no such event exists.
    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError>;
}

pub trait ParticipantRepository: Send + Sync {
    async fn create(&self, participant: &Participant) -> Result<(), ExchangeServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, ExchangeServiceError>;

    async fn find_by_link(
        &self,
        unique_link: &str,
    ) -> Result<Option<Participant>, ExchangeServiceError>;

    /// In creation order.
    async fn list_by_event(&self, event_id: Uuid)
    -> Result<Vec<Participant>, ExchangeServiceError>;

    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError>;

    async fn update_moodboard(
        &self,
        id: Uuid,
        moodboard: &[String],
    ) -> Result<bool, ExchangeServiceError>;
}

pub trait PairingRepository: Send + Sync {
    /// Atomically replace every pairing of `event_id` with `pairings`.
    ///
    /// Readers see either the old set or the new one. Fails with
    /// `GenerationInProgress` while another replace for the event is in flight.
    async fn replace_for_event(
        &self,
        event_id: Uuid,
        pairings: &[Pairing],
    ) -> Result<(), ExchangeServiceError>;

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Pairing>, ExchangeServiceError>;

    async fn find_by_giver(&self, giver_id: Uuid) -> Result<Option<Pairing>, ExchangeServiceError>;

    /// Set `revealed` and stamp `revealed_at` if the pairing is still hidden.
    /// Returns `true` only for the call that performed the transition.
    async fn mark_revealed(
        &self,
        pairing_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError>;
}

pub trait AuthCodeRepository: Send + Sync {
    /// Delete the participant's unverified codes and insert `code`, atomically.
    async fn replace_unverified(&self, code: &AuthCode) -> Result<(), ExchangeServiceError>;

    async fn find_unverified(
        &self,
        participant_id: Uuid,
        code: &str,
    ) -> Result<Option<AuthCode>, ExchangeServiceError>;

    /// Conditionally mark verified. Returns `false` if it was already verified.
    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError>;
}

pub trait AdminRepository: Send + Sync {
    async fn count(&self) -> Result<u64, ExchangeServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminUser>, ExchangeServiceError>;

    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_user_id: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError>;

    /// Approved admin for `provider` whose stored email matches (lowercase).
    async fn find_by_email(
        &self,
        provider: AuthProvider,
        email: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError>;

    /// Attach the provider principal to an approved admin on first sign-in.
    async fn link_identity(
        &self,
        id: Uuid,
        profile: &ProviderProfile,
    ) -> Result<(), ExchangeServiceError>;

    async fn create(&self, admin: &AdminUser) -> Result<(), ExchangeServiceError>;

    async fn list(&self) -> Result<Vec<AdminUser>, ExchangeServiceError>;
}

/// Singleton system-owner claim secret.
pub trait OwnerClaimRepository: Send + Sync {
    /// Store `code` unless a claim already exists. Returns `true` if stored.
    async fn create_if_absent(&self, code: &str) -> Result<bool, ExchangeServiceError>;

    /// Compare-and-delete the claim and create `owner` in one unit.
    ///
    /// Returns `false` with no mutation when the stored code is absent or differs.
    async fn consume(&self, code: &str, owner: &AdminUser) -> Result<bool, ExchangeServiceError>;
}

/// Short-lived store for identities waiting on an ownership claim.
pub trait PendingClaimCache: Send + Sync {
    async fn put(
        &self,
        claim_id: &str,
        identity: &PendingIdentity,
    ) -> Result<(), ExchangeServiceError>;

    async fn get(&self, claim_id: &str) -> Result<Option<PendingIdentity>, ExchangeServiceError>;

    async fn remove(&self, claim_id: &str) -> Result<(), ExchangeServiceError>;
}

pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), ExchangeServiceError>;

    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Vec<AuditLogEntry>, ExchangeServiceError>;
}

/// OAuth2 identity provider (Discord, Google).
pub trait IdentityPort: Send + Sync {
    /// Authorization URL to redirect the browser to. `state` is echoed back on callback.
    fn authorize_url(
        &self,
        provider: AuthProvider,
        state: &str,
    ) -> Result<String, ExchangeServiceError>;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(
        &self,
        provider: AuthProvider,
        code: &str,
    ) -> Result<String, ExchangeServiceError>;

    async fn fetch_profile(
        &self,
        provider: AuthProvider,
        access_token: &str,
    ) -> Result<ProviderProfile, ExchangeServiceError>;
}

/// Message delivery. `false` means this one recipient failed.
pub trait Notifier: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> bool;

    async fn send_whatsapp(&self, to: &str, message: &str) -> bool;
}
