use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use santa_domain::notification::Channel;
use santa_session::identity::AdminIdentity;

use crate::domain::types::DeliveryReport;
use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::messaging::{SendAuthCodesUseCase, SendLinksUseCase, SendTestMessageUseCase};

#[derive(Deserialize)]
pub struct ChannelRequest {
    pub channel: Channel,
}

// ── POST /admin/events/{id}/messages/links ───────────────────────────────────

pub async fn send_links(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<ChannelRequest>,
) -> Result<Json<DeliveryReport>, ExchangeServiceError> {
    let usecase = SendLinksUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        notifier: state.notifier.clone(),
        audit: state.audit(),
        base_url: state.public_base_url.clone(),
    };
    let report = usecase
        .execute(event_id, body.channel, identity.admin_id)
        .await?;
    Ok(Json(report))
}

// ── POST /admin/events/{id}/messages/auth-codes ──────────────────────────────

pub async fn send_auth_codes(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<ChannelRequest>,
) -> Result<Json<DeliveryReport>, ExchangeServiceError> {
    let usecase = SendAuthCodesUseCase {
        events: state.event_repo(),
        participants: state.participant_repo(),
        ledger: state.ledger(),
        notifier: state.notifier.clone(),
        audit: state.audit(),
        base_url: state.public_base_url.clone(),
    };
    let report = usecase
        .execute(event_id, body.channel, identity.admin_id)
        .await?;
    Ok(Json(report))
}

// ── POST /admin/messaging/test ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TestMessageRequest {
    pub channel: Channel,
    pub to: String,
}

pub async fn send_test_message(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<TestMessageRequest>,
) -> Result<StatusCode, ExchangeServiceError> {
    let usecase = SendTestMessageUseCase {
        notifier: state.notifier.clone(),
    };
    usecase.execute(body.channel, &body.to).await?;
    Ok(StatusCode::NO_CONTENT)
}
