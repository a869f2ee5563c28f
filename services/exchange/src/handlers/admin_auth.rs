use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_session::cookie::{
    ADMIN_SESSION_EXP, OAUTH_STATE, PENDING_CLAIM, clear_admin_session_cookie,
    clear_oauth_state_cookie, clear_pending_claim_cookie, set_admin_session_cookie,
    set_oauth_state_cookie, set_pending_claim_cookie,
};
use santa_session::identity::AdminIdentity;
use santa_session::token::{TokenKind, issue_token};

use crate::domain::repository::IdentityPort;
use crate::domain::types::AdminUser;
use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::admin::GetAdminUseCase;
use crate::usecase::ownership::SignInOutcome;

/// Where the browser lands after a successful sign-in.
const ADMIN_HOME: &str = "/admin";
/// Page that collects the system-owner claim code.
const SETUP_OWNER_PAGE: &str = "/admin/setup-owner";

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminResponse {
    pub id: Uuid,
    pub provider: AuthProvider,
    pub username: String,
    pub email: Option<String>,
    pub is_system_owner: bool,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AdminUser> for AdminResponse {
    fn from(a: AdminUser) -> Self {
        Self {
            id: a.id,
            provider: a.provider,
            username: a.username,
            email: a.email,
            is_system_owner: a.is_system_owner,
            created_at: a.created_at,
        }
    }
}

fn parse_provider(raw: &str) -> Result<AuthProvider, ExchangeServiceError> {
    raw.parse()
        .map_err(|_| ExchangeServiceError::InvalidRequest("unknown sign-in provider"))
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    admin: &AdminUser,
) -> Result<CookieJar, ExchangeServiceError> {
    let (token, _) = issue_token(
        TokenKind::AdminSession,
        admin.id,
        admin.is_system_owner,
        ADMIN_SESSION_EXP,
        state.session_secret.as_str(),
    )
    .map_err(|e| anyhow::Error::new(e).context("sign admin session"))?;
    Ok(set_admin_session_cookie(jar, token))
}

// ── GET /auth/{provider} ─────────────────────────────────────────────────────

pub async fn start_sign_in(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ExchangeServiceError> {
    let provider = parse_provider(&provider)?;
    let nonce = Uuid::new_v4().simple().to_string();
    let url = state.identity.authorize_url(provider, &nonce)?;
    Ok((set_oauth_state_cookie(jar, nonce), Redirect::to(&url)))
}

// ── GET /auth/{provider}/callback ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn finish_sign_in(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ExchangeServiceError> {
    let provider = parse_provider(&provider)?;

    let expected = jar.get(OAUTH_STATE).map(|c| c.value().to_owned());
    let jar = clear_oauth_state_cookie(jar);
    if let Some(error) = query.error {
        tracing::info!(%provider, error = %error, "provider denied sign-in");
        return Err(ExchangeServiceError::Unauthorized);
    }
    if expected.is_none() || expected != query.state {
        return Err(ExchangeServiceError::Unauthorized);
    }
    let code = query
        .code
        .ok_or(ExchangeServiceError::InvalidRequest("missing authorization code"))?;

    let access_token = state.identity.exchange_code(provider, &code).await?;
    let profile = state.identity.fetch_profile(provider, &access_token).await?;

    match state.ownership().sign_in(provider, profile).await? {
        SignInOutcome::Admin(admin) => {
            tracing::info!(admin_id = %admin.id, %provider, "admin signed in");
            let jar = start_session(&state, jar, &admin)?;
            Ok((jar, Redirect::to(ADMIN_HOME)))
        }
        SignInOutcome::PendingClaim { claim_id } => Ok((
            set_pending_claim_cookie(jar, claim_id),
            Redirect::to(SETUP_OWNER_PAGE),
        )),
    }
}

// ── POST /admin/claim-ownership ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ClaimOwnershipRequest {
    pub code: String,
}

pub async fn claim_ownership(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<ClaimOwnershipRequest>,
) -> Result<(CookieJar, Json<AdminResponse>), ExchangeServiceError> {
    let claim_id = jar
        .get(PENDING_CLAIM)
        .map(|c| c.value().to_owned())
        .ok_or(ExchangeServiceError::ClaimWindowExpired)?;

    let owner = state.ownership().claim(&claim_id, &body.code).await?;

    let jar = start_session(&state, clear_pending_claim_cookie(jar), &owner)?;
    Ok((jar, Json(owner.into())))
}

// ── GET /admin/session ───────────────────────────────────────────────────────

pub async fn get_session(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<AdminResponse>, ExchangeServiceError> {
    let usecase = GetAdminUseCase {
        admins: state.admin_repo(),
    };
    let admin = usecase.execute(identity.admin_id).await?;
    Ok(Json(admin.into()))
}

// ── DELETE /admin/session ────────────────────────────────────────────────────

pub async fn sign_out(jar: CookieJar) -> (CookieJar, StatusCode) {
    (clear_admin_session_cookie(jar), StatusCode::NO_CONTENT)
}
