use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{
    AuditRepository, AuthCodeRepository, EventRepository, ParticipantRepository,
};
use crate::domain::types::{AUTH_CODE_EXPIRY_RANGE, AUTH_CODE_LEN, AuthCode, Participant};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

/// Uniform over 000000–999999, zero-padded.
pub fn generate_code() -> String {
    let n = rand::rng().random_range(0..1_000_000u32);
    format!("{n:0width$}", width = AUTH_CODE_LEN)
}

// ── AuthCodeLedger ───────────────────────────────────────────────────────────

/// Issues and verifies per-participant access codes.
///
/// At most one unverified code exists per participant; a verified code is
/// spent. Expiry is checked lazily, at verification time.
pub struct AuthCodeLedger<C: AuthCodeRepository> {
    pub repo: C,
}

impl<C: AuthCodeRepository> AuthCodeLedger<C> {
    pub async fn issue(
        &self,
        participant_id: Uuid,
        expiry_hours: u32,
    ) -> Result<AuthCode, ExchangeServiceError> {
        let now = Utc::now();
        let code = AuthCode {
            id: Uuid::new_v4(),
            participant_id,
            code: generate_code(),
            expires_at: now + Duration::hours(i64::from(expiry_hours)),
            verified: false,
            verified_at: None,
            created_at: now,
        };
        self.repo.replace_unverified(&code).await?;
        Ok(code)
    }

    /// Wrong, spent and never-issued codes all fail with `InvalidCode`.
    pub async fn verify(
        &self,
        participant_id: Uuid,
        code: &str,
    ) -> Result<AuthCode, ExchangeServiceError> {
        let mut found = self
            .repo
            .find_unverified(participant_id, code.trim())
            .await?
            .ok_or(ExchangeServiceError::InvalidCode)?;

        let now = Utc::now();
        if found.is_expired_at(now) {
            return Err(ExchangeServiceError::CodeExpired);
        }

        // A concurrent verifier may have spent it between the read and here.
        if !self.repo.mark_verified(found.id, now).await? {
            return Err(ExchangeServiceError::InvalidCode);
        }
        found.verified = true;
        found.verified_at = Some(now);
        Ok(found)
    }
}

// ── IssueAuthCode (admin) ────────────────────────────────────────────────────

pub struct IssueAuthCodeInput {
    pub participant_id: Uuid,
    /// Overrides the event's `auth_code_expiry_hours`.
    pub expiry_hours: Option<u32>,
    pub actor: Uuid,
}

pub struct IssueAuthCodeUseCase<P, E, C, A>
where
    P: ParticipantRepository,
    E: EventRepository,
    C: AuthCodeRepository,
    A: AuditRepository,
{
    pub participants: P,
    pub events: E,
    pub ledger: AuthCodeLedger<C>,
    pub audit: AuditRecorder<A>,
}

impl<P, E, C, A> IssueAuthCodeUseCase<P, E, C, A>
where
    P: ParticipantRepository,
    E: EventRepository,
    C: AuthCodeRepository,
    A: AuditRepository,
{
    pub async fn execute(&self, input: IssueAuthCodeInput) -> Result<AuthCode, ExchangeServiceError> {
        let participant = self
            .participants
            .find_by_id(input.participant_id)
            .await?
            .ok_or(ExchangeServiceError::ParticipantNotFound)?;
        let event = self
            .events
            .find_by_id(participant.event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;

        let hours = input.expiry_hours.unwrap_or(event.auth_code_expiry_hours);
        if !AUTH_CODE_EXPIRY_RANGE.contains(&hours) {
            return Err(ExchangeServiceError::InvalidRequest(
                "expiry hours must be between 1 and 720",
            ));
        }

        let code = self.ledger.issue(participant.id, hours).await?;
        self.audit
            .record(
                Some(input.actor),
                "auth_code.generate",
                "participant",
                Some(participant.id.to_string()),
                json!({ "expires_at": code.expires_at, "expiry_hours": hours }),
            )
            .await;
        Ok(code)
    }
}

// ── VerifyAuthCode (participant) ─────────────────────────────────────────────

pub struct VerifyAuthCodeUseCase<P, C>
where
    P: ParticipantRepository,
    C: AuthCodeRepository,
{
    pub participants: P,
    pub ledger: AuthCodeLedger<C>,
}

impl<P, C> VerifyAuthCodeUseCase<P, C>
where
    P: ParticipantRepository,
    C: AuthCodeRepository,
{
    /// Returns the participant the caller proved to be; the handler persists
    /// the verified marker for it.
    pub async fn execute(
        &self,
        unique_link: &str,
        code: &str,
    ) -> Result<Participant, ExchangeServiceError> {
        let participant = self
            .participants
            .find_by_link(unique_link)
            .await?
            .ok_or(ExchangeServiceError::ParticipantNotFound)?;
        self.ledger.verify(participant.id, code).await?;
        tracing::info!(participant_id = %participant.id, "auth code verified");
        Ok(participant)
    }
}
