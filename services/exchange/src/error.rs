use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Exchange service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeServiceError {
    #[error("at least 3 participants are required")]
    InsufficientParticipants,
    #[error("pairings are already being generated for this event")]
    GenerationInProgress,
    #[error("invalid code")]
    InvalidCode,
    #[error("code expired")]
    CodeExpired,
    #[error("invalid claim code")]
    InvalidClaimCode,
    #[error("claim window expired, sign in again")]
    ClaimWindowExpired,
    #[error("not an approved administrator")]
    NotAnApprovedAdmin,
    #[error("unauthorized")]
    Unauthorized,
    #[error("only the system owner may do this")]
    Forbidden,
    #[error("event not found")]
    EventNotFound,
    #[error("participant not found")]
    ParticipantNotFound,
    #[error("pairing not found")]
    PairingNotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("upstream unavailable")]
    UpstreamUnavailable,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ExchangeServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientParticipants => "INSUFFICIENT_PARTICIPANTS",
            Self::GenerationInProgress => "GENERATION_IN_PROGRESS",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidClaimCode => "INVALID_CLAIM_CODE",
            Self::ClaimWindowExpired => "CLAIM_WINDOW_EXPIRED",
            Self::NotAnApprovedAdmin => "NOT_AN_APPROVED_ADMIN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::PairingNotFound => "PAIRING_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InsufficientParticipants | Self::InvalidRequest(_) | Self::CodeExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCode | Self::InvalidClaimCode | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotAnApprovedAdmin | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EventNotFound | Self::ParticipantNotFound | Self::PairingNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::GenerationInProgress => StatusCode::CONFLICT,
            Self::ClaimWindowExpired => StatusCode::GONE,
            Self::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExchangeServiceError {
    fn into_response(self) -> Response {
        // TraceLayer already records every request; only server-side failures are logged here.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::UpstreamUnavailable => {
                tracing::warn!(kind = "UPSTREAM_UNAVAILABLE", "upstream unavailable")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
