use anyhow::anyhow;
use chrono::Utc;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{
    AuditRepository, EventRepository, PairingRepository, ParticipantRepository,
};
use crate::domain::types::{MIN_PARTICIPANTS, Pairing};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;

/// Receivers for `givers` such that `receivers[i] != givers[i]` for every `i`.
///
/// Shuffles uniformly, then repairs each fixed point by swapping with the next
/// position (cyclically), re-checking the repaired slot before moving on. The
/// result has no fixed points but is not uniform over all derangements.
/// Returns `None` when no derangement exists (fewer than two distinct ids).
pub fn derange(givers: &[Uuid], rng: &mut ThreadRng) -> Option<Vec<Uuid>> {
    let n = givers.len();
    let mut receivers = givers.to_vec();
    receivers.shuffle(rng);

    for i in 0..n {
        let mut offset = 1;
        while receivers[i] == givers[i] && offset < n {
            receivers.swap(i, (i + offset) % n);
            offset += 1;
        }
    }

    is_derangement(givers, &receivers).then_some(receivers)
}

/// No position maps to itself and `receivers` is a permutation of `givers`.
pub fn is_derangement(givers: &[Uuid], receivers: &[Uuid]) -> bool {
    if givers.len() != receivers.len() {
        return false;
    }
    let mut a = givers.to_vec();
    let mut b = receivers.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b && givers.iter().zip(receivers).all(|(g, r)| g != r)
}

// ── GenerateAssignment ───────────────────────────────────────────────────────

pub struct GenerateAssignmentInput {
    pub event_id: Uuid,
    pub actor: Uuid,
}

/// AssignmentEngine: (re)computes an event's pairings and replaces them atomically.
pub struct GenerateAssignmentUseCase<E, P, G, A>
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

impl<E, P, G, A> GenerateAssignmentUseCase<E, P, G, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    G: PairingRepository,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        input: GenerateAssignmentInput,
    ) -> Result<Vec<Pairing>, ExchangeServiceError> {
        let event = self
            .events
            .find_by_id(input.event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;

        let givers: Vec<Uuid> = self
            .participants
            .list_by_event(event.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if givers.len() < MIN_PARTICIPANTS {
            return Err(ExchangeServiceError::InsufficientParticipants);
        }

        let receivers = derange(&givers, &mut rand::rng())
            .ok_or_else(|| anyhow!("derangement post-condition failed for {} ids", givers.len()))?;

        let now = Utc::now();
        let pairings: Vec<Pairing> = givers
            .iter()
            .zip(receivers)
            .map(|(&giver_id, receiver_id)| Pairing {
                id: Uuid::new_v4(),
                event_id: event.id,
                giver_id,
                receiver_id,
                revealed: false,
                revealed_at: None,
                created_at: now,
            })
            .collect();

        self.pairings.replace_for_event(event.id, &pairings).await?;

        tracing::info!(event_id = %event.id, count = pairings.len(), "pairings generated");
        self.audit
            .record(
                Some(input.actor),
                "pairings.generate",
                "event",
                Some(event.id.to_string()),
                json!({ "pairing_count": pairings.len() }),
            )
            .await;

        Ok(pairings)
    }
}
