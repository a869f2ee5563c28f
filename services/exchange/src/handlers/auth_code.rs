use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use santa_session::cookie::{VERIFIED_MARKER_EXP, set_verified_cookie};
use santa_session::identity::AdminIdentity;
use santa_session::token::{TokenKind, issue_token};

use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::auth_code::{IssueAuthCodeInput, IssueAuthCodeUseCase, VerifyAuthCodeUseCase};

// ── POST /admin/participants/{id}/auth-code ──────────────────────────────────

/// Optional body; without one the event's default expiry applies.
#[derive(Deserialize)]
pub struct IssueAuthCodeRequest {
    #[serde(default)]
    pub expiry_hours: Option<u32>,
}

#[derive(Serialize)]
pub struct AuthCodeResponse {
    pub participant_id: Uuid,
    pub code: String,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn issue_auth_code(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Path(participant_id): Path<Uuid>,
    body: Option<Json<IssueAuthCodeRequest>>,
) -> Result<(StatusCode, Json<AuthCodeResponse>), ExchangeServiceError> {
    let usecase = IssueAuthCodeUseCase {
        participants: state.participant_repo(),
        events: state.event_repo(),
        ledger: state.ledger(),
        audit: state.audit(),
    };
    let code = usecase
        .execute(IssueAuthCodeInput {
            participant_id,
            expiry_hours: body.and_then(|Json(b)| b.expiry_hours),
            actor: identity.admin_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthCodeResponse {
            participant_id: code.participant_id,
            code: code.code,
            expires_at: code.expires_at,
        }),
    ))
}

// ── POST /pairing/{link}/verify ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Path(link): Path<String>,
    jar: CookieJar,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<(CookieJar, Json<VerifyCodeResponse>), ExchangeServiceError> {
    let usecase = VerifyAuthCodeUseCase {
        participants: state.participant_repo(),
        ledger: state.ledger(),
    };
    let participant = usecase.execute(&link, &body.code).await?;

    let (marker, _) = issue_token(
        TokenKind::VerifiedParticipant,
        participant.id,
        false,
        VERIFIED_MARKER_EXP,
        state.session_secret.as_str(),
    )
    .map_err(|e| anyhow::Error::new(e).context("sign verified marker"))?;

    Ok((
        set_verified_cookie(jar, participant.id, marker),
        Json(VerifyCodeResponse { verified: true }),
    ))
}
