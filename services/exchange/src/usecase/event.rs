use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use santa_domain::event::EventStatus;

use crate::domain::repository::{
    AuditRepository, EventRepository, PairingRepository, ParticipantRepository,
};
use crate::domain::types::{
    AUTH_CODE_EXPIRY_RANGE, DEFAULT_AUTH_CODE_EXPIRY_HOURS, Event, EventCounts, Participant,
};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

/// Trim entries and drop blank ones, keeping order.
pub(crate) fn clean_list(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_owned())
        .filter(|e| !e.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── CreateEvent ──────────────────────────────────────────────────────────────

pub struct CreateEventInput {
    pub title: String,
    pub description: Option<String>,
    pub actor: Uuid,
}

pub struct CreateEventUseCase<E: EventRepository, A: AuditRepository> {
    pub repo: E,
    pub audit: AuditRecorder<A>,
}

impl<E: EventRepository, A: AuditRepository> CreateEventUseCase<E, A> {
    pub async fn execute(&self, input: CreateEventInput) -> Result<Event, ExchangeServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ExchangeServiceError::InvalidRequest("title is required"));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: non_blank(input.description),
            status: EventStatus::Active,
            closure_message: None,
            require_auth_codes: false,
            auth_code_expiry_hours: DEFAULT_AUTH_CODE_EXPIRY_HOURS,
            hide_pairings_from_admins: false,
            rules: Vec::new(),
            created_by: Some(input.actor),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&event).await?;

        self.audit
            .record(
                Some(input.actor),
                "event.create",
                "event",
                Some(event.id.to_string()),
                json!({ "title": event.title }),
            )
            .await;
        Ok(event)
    }
}

// ── ListEvents ───────────────────────────────────────────────────────────────

pub struct ListEventsUseCase<E: EventRepository> {
    pub repo: E,
}

impl<E: EventRepository> ListEventsUseCase<E> {
    pub async fn execute(&self) -> Result<Vec<Event>, ExchangeServiceError> {
        self.repo.list().await
    }
}

// ── GetEvent ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EventDetail {
    pub event: Event,
    pub participants: Vec<Participant>,
    pub counts: EventCounts,
}

pub struct GetEventUseCase<E, P, G>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
{
    pub events: E,
    pub participants: P,
    pub pairings: G,
}

impl<E, P, G> GetEventUseCase<E, P, G>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
{
    pub async fn execute(&self, id: Uuid) -> Result<EventDetail, ExchangeServiceError> {
        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        let participants = self.participants.list_by_event(id).await?;
        let pairings = self.pairings.list_by_event(id).await?;
        let counts = EventCounts::tally(participants.len(), &pairings);
        Ok(EventDetail {
            event,
            participants,
            counts,
        })
    }
}

// ── UpdateEvent ──────────────────────────────────────────────────────────────

/// Fields left `None` are unchanged. An empty `closure_message` clears it.
#[derive(Debug, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
    pub closure_message: Option<String>,
    pub require_auth_codes: Option<bool>,
    pub auth_code_expiry_hours: Option<u32>,
    pub hide_pairings_from_admins: Option<bool>,
}

pub struct UpdateEventUseCase<E: EventRepository, A: AuditRepository> {
    pub repo: E,
    pub audit: AuditRecorder<A>,
}

impl<E: EventRepository, A: AuditRepository> UpdateEventUseCase<E, A> {
    pub async fn execute(
        &self,
        id: Uuid,
        patch: EventPatch,
        actor: Uuid,
    ) -> Result<Event, ExchangeServiceError> {
        let mut event = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;

        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ExchangeServiceError::InvalidRequest("title is required"));
            }
            event.title = title.to_owned();
        }
        if let Some(hours) = patch.auth_code_expiry_hours {
            if !AUTH_CODE_EXPIRY_RANGE.contains(&hours) {
                return Err(ExchangeServiceError::InvalidRequest(
                    "expiry hours must be between 1 and 720",
                ));
            }
            event.auth_code_expiry_hours = hours;
        }
        if patch.description.is_some() {
            event.description = non_blank(patch.description);
        }
        if patch.closure_message.is_some() {
            event.closure_message = non_blank(patch.closure_message);
        }
        if let Some(status) = patch.status {
            event.status = status;
        }
        if let Some(require) = patch.require_auth_codes {
            event.require_auth_codes = require;
        }
        if let Some(hide) = patch.hide_pairings_from_admins {
            event.hide_pairings_from_admins = hide;
        }
        event.updated_at = Utc::now();

        self.repo.update(&event).await?;
        self.audit
            .record(
                Some(actor),
                "event.update",
                "event",
                Some(event.id.to_string()),
                json!({
                    "status": event.status,
                    "require_auth_codes": event.require_auth_codes,
                    "auth_code_expiry_hours": event.auth_code_expiry_hours,
                    "hide_pairings_from_admins": event.hide_pairings_from_admins,
                }),
            )
            .await;
        Ok(event)
    }
}

// ── UpdateRules ──────────────────────────────────────────────────────────────

pub struct UpdateRulesUseCase<E: EventRepository, A: AuditRepository> {
    pub repo: E,
    pub audit: AuditRecorder<A>,
}

impl<E: EventRepository, A: AuditRepository> UpdateRulesUseCase<E, A> {
    pub async fn execute(
        &self,
        id: Uuid,
        rules: Vec<String>,
        actor: Uuid,
    ) -> Result<Event, ExchangeServiceError> {
        let mut event = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        event.rules = clean_list(rules);
        event.updated_at = Utc::now();
        self.repo.update(&event).await?;

        self.audit
            .record(
                Some(actor),
                "event.rules.update",
                "event",
                Some(event.id.to_string()),
                json!({ "rule_count": event.rules.len() }),
            )
            .await;
        Ok(event)
    }
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

pub struct DeleteEventUseCase<E: EventRepository, A: AuditRepository> {
    pub repo: E,
    pub audit: AuditRecorder<A>,
}

impl<E: EventRepository, A: AuditRepository> DeleteEventUseCase<E, A> {
    pub async fn execute(&self, id: Uuid, actor: Uuid) -> Result<(), ExchangeServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ExchangeServiceError::EventNotFound);
        }
        self.audit
            .record(
                Some(actor),
                "event.delete",
                "event",
                Some(id.to_string()),
                json!({}),
            )
            .await;
        Ok(())
    }
}
