use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use santa_session::identity::participant_verified;

use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::reveal::{
    PairingView, RevealPairingUseCase, RevealStateMachine, ViewPairingUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Tagged by `state` so the page can pick which screen to render.
#[derive(Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PairingViewResponse {
    Closed {
        message: String,
    },
    VerificationRequired {
        participant_name: String,
        event_title: String,
    },
    NotAssigned {
        participant_name: String,
        event_title: String,
    },
    ReadyToReveal {
        participant_name: String,
        event_title: String,
        rules: Vec<String>,
    },
    Ready {
        participant_name: String,
        receiver_name: String,
        receiver_moodboard: Vec<String>,
        event_title: String,
        rules: Vec<String>,
        revealed: bool,
        #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms_opt")]
        revealed_at: Option<DateTime<Utc>>,
    },
}

impl From<PairingView> for PairingViewResponse {
    fn from(view: PairingView) -> Self {
        match view {
            PairingView::Closed { message } => Self::Closed { message },
            PairingView::VerificationRequired {
                participant_name,
                event_title,
            } => Self::VerificationRequired {
                participant_name,
                event_title,
            },
            PairingView::NotAssigned {
                participant_name,
                event_title,
            } => Self::NotAssigned {
                participant_name,
                event_title,
            },
            PairingView::ReadyToReveal {
                participant_name,
                event_title,
                rules,
            } => Self::ReadyToReveal {
                participant_name,
                event_title,
                rules,
            },
            PairingView::Ready(a) => Self::Ready {
                participant_name: a.participant_name,
                receiver_name: a.receiver_name,
                receiver_moodboard: a.receiver_moodboard,
                event_title: a.event_title,
                rules: a.rules,
                revealed: a.revealed,
                revealed_at: a.revealed_at,
            },
        }
    }
}

// ── GET /pairing/{link} ──────────────────────────────────────────────────────

pub async fn view_pairing(
    State(state): State<AppState>,
    Path(link): Path<String>,
    jar: CookieJar,
) -> Result<Json<PairingViewResponse>, ExchangeServiceError> {
    let usecase = ViewPairingUseCase {
        participants: state.participant_repo(),
        events: state.event_repo(),
        pairings: state.pairing_repo(),
    };
    let view = usecase
        .execute(&link, |id| {
            participant_verified(&jar, id, &state.session_secret)
        })
        .await?;
    Ok(Json(view.into()))
}

// ── POST /pairing/{link}/reveal ──────────────────────────────────────────────

pub async fn reveal_pairing(
    State(state): State<AppState>,
    Path(link): Path<String>,
    jar: CookieJar,
) -> Result<Json<PairingViewResponse>, ExchangeServiceError> {
    let usecase = RevealPairingUseCase {
        participants: state.participant_repo(),
        events: state.event_repo(),
        machine: RevealStateMachine {
            repo: state.pairing_repo(),
        },
        audit: state.audit(),
    };
    let view = usecase
        .execute(&link, |id| {
            participant_verified(&jar, id, &state.session_secret)
        })
        .await?;
    Ok(Json(view.into()))
}
