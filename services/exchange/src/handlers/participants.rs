use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use santa_session::identity::AdminIdentity;

use crate::domain::types::Participant;
use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::messaging::pairing_link;
use crate::usecase::participant::{
    AddParticipantInput, AddParticipantUseCase, DeleteParticipantUseCase,
    ListParticipantsUseCase, UpdateMoodboardUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
    pub unique_link: String,
    /// Full reveal-page URL for copy/paste distribution.
    pub link: String,
    pub moodboard: Vec<String>,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl ParticipantResponse {
    pub fn new(base_url: &str, p: Participant) -> Self {
        let link = pairing_link(base_url, &p);
        Self {
            id: p.id,
            event_id: p.event_id,
            name: p.name,
            email: p.email,
            phone_number: p.phone_number,
            country_code: p.country_code,
            unique_link: p.unique_link,
            link,
            moodboard: p.moodboard,
            created_at: p.created_at,
        }
    }
}

// ── POST /admin/events/{id}/participants ─────────────────────────────────────

#[derive(Deserialize)]
pub struct AddParticipantRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
}

pub async fn add_participant(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ExchangeServiceError> {
    let usecase = AddParticipantUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        pairings: state.pairing_repo(),
        audit: state.audit(),
    };
    let participant = usecase
        .execute(AddParticipantInput {
            event_id,
            name: body.name,
            email: body.email,
            phone_number: body.phone_number,
            country_code: body.country_code,
            actor: identity.admin_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ParticipantResponse::new(&state.public_base_url, participant)),
    ))
}

// ── GET /admin/events/{id}/participants ──────────────────────────────────────

pub async fn list_participants(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<ParticipantResponse>>, ExchangeServiceError> {
    let usecase = ListParticipantsUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
    };
    let participants = usecase.execute(event_id).await?;
    Ok(Json(
        participants
            .into_iter()
            .map(|p| ParticipantResponse::new(&state.public_base_url, p))
            .collect(),
    ))
}

// ── DELETE /admin/participants/{id} ──────────────────────────────────────────

pub async fn delete_participant(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ExchangeServiceError> {
    let usecase = DeleteParticipantUseCase {
        participants: state.participant_repo(),
        pairings: state.pairing_repo(),
        audit: state.audit(),
    };
    usecase.execute(id, identity.admin_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /admin/participants/{id}/moodboard ───────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct MoodboardBody {
    pub moodboard: Vec<String>,
}

pub async fn update_moodboard(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoodboardBody>,
) -> Result<Json<MoodboardBody>, ExchangeServiceError> {
    let usecase = UpdateMoodboardUseCase {
        participants: state.participant_repo(),
    };
    let moodboard = usecase.execute(id, body.moodboard).await?;
    Ok(Json(MoodboardBody { moodboard }))
}
