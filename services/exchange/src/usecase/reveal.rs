use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{
    AuditRepository, EventRepository, PairingRepository, ParticipantRepository,
};
use crate::domain::types::{Event, EventCounts, Pairing, Participant};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

// ── RevealStateMachine ───────────────────────────────────────────────────────

/// `Hidden → Revealed`, one way.
pub struct RevealStateMachine<G: PairingRepository> {
    pub repo: G,
}

/// Pairing after a reveal, and whether this call flipped it.
#[derive(Debug, Clone)]
pub struct Revealed {
    pub pairing: Pairing,
    pub first_reveal: bool,
}

impl<G: PairingRepository> RevealStateMachine<G> {
    /// Idempotent: revealing twice keeps the first `revealed_at`.
    pub async fn reveal(&self, giver_id: Uuid) -> Result<Revealed, ExchangeServiceError> {
        let mut pairing = self
            .repo
            .find_by_giver(giver_id)
            .await?
            .ok_or(ExchangeServiceError::PairingNotFound)?;
        if pairing.revealed {
            return Ok(Revealed {
                pairing,
                first_reveal: false,
            });
        }

        let now = Utc::now();
        if self.repo.mark_revealed(pairing.id, now).await? {
            pairing.revealed = true;
            pairing.revealed_at = Some(now);
            return Ok(Revealed {
                pairing,
                first_reveal: true,
            });
        }

        // Lost a race with another reveal; report the stored timestamp.
        let pairing = self
            .repo
            .find_by_giver(giver_id)
            .await?
            .ok_or(ExchangeServiceError::PairingNotFound)?;
        Ok(Revealed {
            pairing,
            first_reveal: false,
        })
    }
}

// ── Participant reveal surface ───────────────────────────────────────────────

/// What a participant's link shows, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingView {
    /// Event closed; overrides everything else.
    Closed { message: String },
    /// Event requires an auth code and this browser has not passed it.
    VerificationRequired {
        participant_name: String,
        event_title: String,
    },
    /// Pairings have not been generated yet.
    NotAssigned {
        participant_name: String,
        event_title: String,
    },
    /// Assigned but not yet revealed; the receiver stays concealed.
    ReadyToReveal {
        participant_name: String,
        event_title: String,
        rules: Vec<String>,
    },
    Ready(Assignment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub participant_name: String,
    pub receiver_name: String,
    pub receiver_moodboard: Vec<String>,
    pub event_title: String,
    pub rules: Vec<String>,
    pub revealed: bool,
    pub revealed_at: Option<DateTime<Utc>>,
}

/// Gate reached by a participant link before any assignment is shown.
enum Gate {
    Closed(String),
    Unverified(Participant, Event),
    Open(Participant, Event),
}

async fn resolve_gate<P, E>(
    participants: &P,
    events: &E,
    unique_link: &str,
    is_verified: impl FnOnce(Uuid) -> bool,
) -> Result<Gate, ExchangeServiceError>
where
    P: ParticipantRepository,
    E: EventRepository,
{
    let participant = participants
        .find_by_link(unique_link)
        .await?
        .ok_or(ExchangeServiceError::ParticipantNotFound)?;
    let event = events
        .find_by_id(participant.event_id)
        .await?
        .ok_or(ExchangeServiceError::EventNotFound)?;

    if event.status.is_closed() {
        return Ok(Gate::Closed(event.closure_text()));
    }
    if event.require_auth_codes && !is_verified(participant.id) {
        return Ok(Gate::Unverified(participant, event));
    }
    Ok(Gate::Open(participant, event))
}

pub struct ViewPairingUseCase<P, E, G>
where
    P: ParticipantRepository,
    E: EventRepository,
    G: PairingRepository,
{
    pub participants: P,
    pub events: E,
    pub pairings: G,
}

impl<P, E, G> ViewPairingUseCase<P, E, G>
where
    P: ParticipantRepository,
    E: EventRepository,
    G: PairingRepository,
{
    /// `is_verified` reports whether the caller holds a valid verified marker
    /// for the resolved participant.
    pub async fn execute(
        &self,
        unique_link: &str,
        is_verified: impl FnOnce(Uuid) -> bool,
    ) -> Result<PairingView, ExchangeServiceError> {
        let (participant, event) =
            match resolve_gate(&self.participants, &self.events, unique_link, is_verified).await? {
                Gate::Closed(message) => return Ok(PairingView::Closed { message }),
                Gate::Unverified(participant, event) => {
                    return Ok(PairingView::VerificationRequired {
                        participant_name: participant.name,
                        event_title: event.title,
                    });
                }
                Gate::Open(participant, event) => (participant, event),
            };

        let Some(pairing) = self.pairings.find_by_giver(participant.id).await? else {
            return Ok(PairingView::NotAssigned {
                participant_name: participant.name,
                event_title: event.title,
            });
        };
        if !pairing.revealed {
            return Ok(PairingView::ReadyToReveal {
                participant_name: participant.name,
                event_title: event.title,
                rules: event.rules,
            });
        }
        let receiver = self
            .participants
            .find_by_id(pairing.receiver_id)
            .await?
            .ok_or(ExchangeServiceError::ParticipantNotFound)?;

        Ok(PairingView::Ready(Assignment {
            participant_name: participant.name,
            receiver_name: receiver.name,
            receiver_moodboard: receiver.moodboard,
            event_title: event.title,
            rules: event.rules,
            revealed: pairing.revealed,
            revealed_at: pairing.revealed_at,
        }))
    }
}

pub struct RevealPairingUseCase<P, E, G, A>
where
    P: ParticipantRepository,
    E: EventRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    pub participants: P,
    pub events: E,
    pub machine: RevealStateMachine<G>,
    pub audit: AuditRecorder<A>,
}

impl<P, E, G, A> RevealPairingUseCase<P, E, G, A>
where
    P: ParticipantRepository,
    E: EventRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        unique_link: &str,
        is_verified: impl FnOnce(Uuid) -> bool,
    ) -> Result<PairingView, ExchangeServiceError> {
        let (participant, event) =
            match resolve_gate(&self.participants, &self.events, unique_link, is_verified).await? {
                Gate::Closed(message) => return Ok(PairingView::Closed { message }),
                Gate::Unverified(_, _) => return Err(ExchangeServiceError::Unauthorized),
                Gate::Open(participant, event) => (participant, event),
            };

        let Revealed {
            pairing,
            first_reveal,
        } = self.machine.reveal(participant.id).await?;
        let receiver = self
            .participants
            .find_by_id(pairing.receiver_id)
            .await?
            .ok_or(ExchangeServiceError::ParticipantNotFound)?;

        if first_reveal {
            self.audit
                .record(
                    None,
                    "pairing.reveal",
                    "pairing",
                    Some(pairing.id.to_string()),
                    json!({ "event_id": event.id, "participant_id": participant.id }),
                )
                .await;
        }

        Ok(PairingView::Ready(Assignment {
            participant_name: participant.name,
            receiver_name: receiver.name,
            receiver_moodboard: receiver.moodboard,
            event_title: event.title,
            rules: event.rules,
            revealed: pairing.revealed,
            revealed_at: pairing.revealed_at,
        }))
    }
}

// ── Admin pairing view ───────────────────────────────────────────────────────

/// A pairing endpoint as an administrator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    Visible { id: Uuid, name: String },
    /// Concealed by the event's hide-pairings policy.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPairingRow {
    pub id: Uuid,
    pub giver: Party,
    pub receiver: Party,
    pub revealed: bool,
    pub revealed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AdminPairings {
    pub hidden: bool,
    pub counts: EventCounts,
    pub rows: Vec<AdminPairingRow>,
}

pub struct ListPairingsUseCase<E, P, G>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
{
    pub events: E,
    pub participants: P,
    pub pairings: G,
}

impl<E, P, G> ListPairingsUseCase<E, P, G>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
{
    /// Rows and counts are always returned; only giver/receiver identities are
    /// replaced when the event hides pairings from administrators.
    pub async fn execute(&self, event_id: Uuid) -> Result<AdminPairings, ExchangeServiceError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        let participants = self.participants.list_by_event(event.id).await?;
        let pairings = self.pairings.list_by_event(event.id).await?;
        let counts = EventCounts::tally(participants.len(), &pairings);
        let hidden = event.hide_pairings_from_admins;

        let party = |id: Uuid| {
            if hidden {
                return Party::Hidden;
            }
            let name = participants
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            Party::Visible { id, name }
        };

        let rows = pairings
            .iter()
            .map(|p| AdminPairingRow {
                id: p.id,
                giver: party(p.giver_id),
                receiver: party(p.receiver_id),
                revealed: p.revealed,
                revealed_at: p.revealed_at,
            })
            .collect();

        Ok(AdminPairings {
            hidden,
            counts,
            rows,
        })
    }
}
