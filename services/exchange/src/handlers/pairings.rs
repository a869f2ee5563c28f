use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use santa_session::identity::AdminIdentity;

use crate::domain::types::EventCounts;
use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::assignment::{GenerateAssignmentInput, GenerateAssignmentUseCase};
use crate::usecase::reveal::{AdminPairingRow, ListPairingsUseCase, Party};

// ── Response types ───────────────────────────────────────────────────────────

/// Hidden parties serialize as the bare string `"hidden"`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum PartyResponse {
    Visible { id: Uuid, name: String },
    Hidden(&'static str),
}

impl From<Party> for PartyResponse {
    fn from(p: Party) -> Self {
        match p {
            Party::Visible { id, name } => Self::Visible { id, name },
            Party::Hidden => Self::Hidden("hidden"),
        }
    }
}

#[derive(Serialize)]
pub struct PairingRowResponse {
    pub id: Uuid,
    pub giver: PartyResponse,
    pub receiver: PartyResponse,
    pub revealed: bool,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms_opt")]
    pub revealed_at: Option<DateTime<Utc>>,
}

impl From<AdminPairingRow> for PairingRowResponse {
    fn from(r: AdminPairingRow) -> Self {
        Self {
            id: r.id,
            giver: r.giver.into(),
            receiver: r.receiver.into(),
            revealed: r.revealed,
            revealed_at: r.revealed_at,
        }
    }
}

#[derive(Serialize)]
pub struct PairingsResponse {
    pub hidden: bool,
    #[serde(flatten)]
    pub counts: EventCounts,
    pub pairings: Vec<PairingRowResponse>,
}

#[derive(Serialize)]
pub struct GeneratedResponse {
    pub pairing_count: usize,
}

// ── POST /admin/events/{id}/pairings ─────────────────────────────────────────

/// Only the count is returned so hide-pairings mode is not bypassed here.
pub async fn generate_pairings(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<GeneratedResponse>), ExchangeServiceError> {
    let usecase = GenerateAssignmentUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        pairings: state.pairing_repo(),
        audit: state.audit(),
    };
    let pairings = usecase
        .execute(GenerateAssignmentInput {
            event_id,
            actor: identity.admin_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(GeneratedResponse {
            pairing_count: pairings.len(),
        }),
    ))
}

// ── GET /admin/events/{id}/pairings ──────────────────────────────────────────

pub async fn list_pairings(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<PairingsResponse>, ExchangeServiceError> {
    let usecase = ListPairingsUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        pairings: state.pairing_repo(),
    };
    let view = usecase.execute(event_id).await?;
    Ok(Json(PairingsResponse {
        hidden: view.hidden,
        counts: view.counts,
        pairings: view.rows.into_iter().map(Into::into).collect(),
    }))
}
