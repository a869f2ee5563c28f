use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use santa_domain::event::EventStatus;
use santa_session::identity::AdminIdentity;

use crate::domain::types::{Event, EventCounts};
use crate::error::ExchangeServiceError;
use crate::handlers::participants::ParticipantResponse;
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventInput, CreateEventUseCase, DeleteEventUseCase, EventPatch, GetEventUseCase,
    ListEventsUseCase, UpdateEventUseCase, UpdateRulesUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub closure_message: Option<String>,
    pub require_auth_codes: bool,
    pub auth_code_expiry_hours: u32,
    pub hide_pairings_from_admins: bool,
    pub rules: Vec<String>,
    pub created_by: Option<Uuid>,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            status: e.status,
            closure_message: e.closure_message,
            require_auth_codes: e.require_auth_codes,
            auth_code_expiry_hours: e.auth_code_expiry_hours,
            hide_pairings_from_admins: e.hide_pairings_from_admins,
            rules: e.rules,
            created_by: e.created_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub participants: Vec<ParticipantResponse>,
    #[serde(flatten)]
    pub counts: EventCounts,
}

// ── POST /admin/events ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
}

pub async fn create_event(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ExchangeServiceError> {
    let usecase = CreateEventUseCase {
        repo: state.event_repo(),
        audit: state.audit(),
    };
    let event = usecase
        .execute(CreateEventInput {
            title: body.title,
            description: body.description,
            actor: identity.admin_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

// ── GET /admin/events ────────────────────────────────────────────────────────

pub async fn list_events(
    _identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, ExchangeServiceError> {
    let usecase = ListEventsUseCase {
        repo: state.event_repo(),
    };
    let events = usecase.execute().await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

// ── GET /admin/events/{id} ───────────────────────────────────────────────────

pub async fn get_event(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetailResponse>, ExchangeServiceError> {
    let usecase = GetEventUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        pairings: state.pairing_repo(),
    };
    let detail = usecase.execute(id).await?;
    let participants = detail
        .participants
        .into_iter()
        .map(|p| ParticipantResponse::new(&state.public_base_url, p))
        .collect();
    Ok(Json(EventDetailResponse {
        event: detail.event.into(),
        participants,
        counts: detail.counts,
    }))
}

// ── PATCH /admin/events/{id} ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
    pub closure_message: Option<String>,
    pub require_auth_codes: Option<bool>,
    pub auth_code_expiry_hours: Option<u32>,
    pub hide_pairings_from_admins: Option<bool>,
}

pub async fn update_event(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ExchangeServiceError> {
    let usecase = UpdateEventUseCase {
        repo: state.event_repo(),
        audit: state.audit(),
    };
    let patch = EventPatch {
        title: body.title,
        description: body.description,
        status: body.status,
        closure_message: body.closure_message,
        require_auth_codes: body.require_auth_codes,
        auth_code_expiry_hours: body.auth_code_expiry_hours,
        hide_pairings_from_admins: body.hide_pairings_from_admins,
    };
    let event = usecase.execute(id, patch, identity.admin_id).await?;
    Ok(Json(event.into()))
}

// ── PUT /admin/events/{id}/rules ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRulesRequest {
    pub rules: Vec<String>,
}

pub async fn update_rules(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRulesRequest>,
) -> Result<Json<EventResponse>, ExchangeServiceError> {
    let usecase = UpdateRulesUseCase {
        repo: state.event_repo(),
        audit: state.audit(),
    };
    let event = usecase.execute(id, body.rules, identity.admin_id).await?;
    Ok(Json(event.into()))
}

// ── DELETE /admin/events/{id} ────────────────────────────────────────────────

pub async fn delete_event(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ExchangeServiceError> {
    let usecase = DeleteEventUseCase {
        repo: state.event_repo(),
        audit: state.audit(),
    };
    usecase.execute(id, identity.admin_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
