use chrono::Utc;
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{
    AuditRepository, EventRepository, PairingRepository, ParticipantRepository,
};
use crate::domain::types::{Participant, UNIQUE_LINK_LEN};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::event::clean_list;

/// URL-safe alphabet for participant links.
const LINK_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// 32 characters from the thread-local CSPRNG, 192 bits.
pub fn generate_unique_link() -> String {
    let mut rng = rand::rng();
    (0..UNIQUE_LINK_LEN)
        .map(|_| LINK_CHARSET[rng.random_range(0..LINK_CHARSET.len())] as char)
        .collect()
}

/// Drop an event's pairings before its roster changes.
///
/// Givers and receivers must each be exactly the participant set, so a roster
/// change invalidates the whole assignment until it is regenerated.
async fn clear_pairings<G, A>(
    pairings: &G,
    audit: &AuditRecorder<A>,
    event_id: Uuid,
    actor: Uuid,
    reason: &str,
) -> Result<(), ExchangeServiceError>
where
    G: PairingRepository,
    A: AuditRepository,
{
    let existing = pairings.list_by_event(event_id).await?;
    if existing.is_empty() {
        return Ok(());
    }
    pairings.replace_for_event(event_id, &[]).await?;
    tracing::info!(%event_id, cleared = existing.len(), reason, "pairings cleared");
    audit
        .record(
            Some(actor),
            "pairings.clear",
            "event",
            Some(event_id.to_string()),
            json!({ "cleared": existing.len(), "reason": reason }),
        )
        .await;
    Ok(())
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── AddParticipant ───────────────────────────────────────────────────────────

pub struct AddParticipantInput {
    pub event_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
    pub actor: Uuid,
}

pub struct AddParticipantUseCase<E, P, G, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    pub events: E,
    pub participants: P,
    pub pairings: G,
    pub audit: AuditRecorder<A>,
}

impl<E, P, G, A> AddParticipantUseCase<E, P, G, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    /// Existing pairings for the event are cleared first.
    pub async fn execute(
        &self,
        input: AddParticipantInput,
    ) -> Result<Participant, ExchangeServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ExchangeServiceError::InvalidRequest("name is required"));
        }
        let event = self
            .events
            .find_by_id(input.event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        clear_pairings(
            &self.pairings,
            &self.audit,
            event.id,
            input.actor,
            "participant added",
        )
        .await?;

        let participant = Participant {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: name.to_owned(),
            email: optional_field(input.email),
            phone_number: optional_field(input.phone_number),
            country_code: optional_field(input.country_code),
            unique_link: generate_unique_link(),
            moodboard: Vec::new(),
            created_at: Utc::now(),
        };
        self.participants.create(&participant).await?;

        self.audit
            .record(
                Some(input.actor),
                "participant.create",
                "participant",
                Some(participant.id.to_string()),
                json!({ "event_id": event.id, "name": participant.name }),
            )
            .await;
        Ok(participant)
    }
}

// ── ListParticipants ─────────────────────────────────────────────────────────

pub struct ListParticipantsUseCase<E: EventRepository, P: ParticipantRepository> {
    pub events: E,
    pub participants: P,
}

impl<E: EventRepository, P: ParticipantRepository> ListParticipantsUseCase<E, P> {
    pub async fn execute(&self, event_id: Uuid) -> Result<Vec<Participant>, ExchangeServiceError> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(ExchangeServiceError::EventNotFound);
        }
        self.participants.list_by_event(event_id).await
    }
}

// ── DeleteParticipant ────────────────────────────────────────────────────────

pub struct DeleteParticipantUseCase<P, G, A>
where
    P: ParticipantRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    pub participants: P,
    pub pairings: G,
    pub audit: AuditRecorder<A>,
}

impl<P, G, A> DeleteParticipantUseCase<P, G, A>
where
    P: ParticipantRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    /// Existing pairings for the participant's event are cleared first.
    pub async fn execute(&self, id: Uuid, actor: Uuid) -> Result<(), ExchangeServiceError> {
        let participant = self
            .participants
            .find_by_id(id)
            .await?
            .ok_or(ExchangeServiceError::ParticipantNotFound)?;
        clear_pairings(
            &self.pairings,
            &self.audit,
            participant.event_id,
            actor,
            "participant removed",
        )
        .await?;

        if !self.participants.delete(id).await? {
            return Err(ExchangeServiceError::ParticipantNotFound);
        }
        self.audit
            .record(
                Some(actor),
                "participant.delete",
                "participant",
                Some(id.to_string()),
                json!({ "event_id": participant.event_id }),
            )
            .await;
        Ok(())
    }
}

// ── UpdateMoodboard ──────────────────────────────────────────────────────────

pub struct UpdateMoodboardUseCase<P: ParticipantRepository> {
    pub participants: P,
}

impl<P: ParticipantRepository> UpdateMoodboardUseCase<P> {
    pub async fn execute(
        &self,
        id: Uuid,
        entries: Vec<String>,
    ) -> Result<Vec<String>, ExchangeServiceError> {
        let moodboard = clean_list(entries);
        if !self.participants.update_moodboard(id, &moodboard).await? {
            return Err(ExchangeServiceError::ParticipantNotFound);
        }
        Ok(moodboard)
    }
}
