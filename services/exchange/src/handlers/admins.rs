use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use santa_domain::admin::AuthProvider;
use santa_session::identity::AdminIdentity;

use crate::error::ExchangeServiceError;
use crate::handlers::admin_auth::AdminResponse;
use crate::state::AppState;
use crate::usecase::admin::{ApproveAdminInput, ApproveAdminUseCase, ListAdminsUseCase};

// ── GET /admin/admins ────────────────────────────────────────────────────────

pub async fn list_admins(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminResponse>>, ExchangeServiceError> {
    let usecase = ListAdminsUseCase {
        admins: state.admin_repo(),
    };
    let admins = usecase.execute(identity).await?;
    Ok(Json(admins.into_iter().map(Into::into).collect()))
}

// ── POST /admin/admins ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ApproveAdminRequest {
    pub provider: AuthProvider,
    pub email: String,
}

pub async fn approve_admin(
    identity: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<ApproveAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), ExchangeServiceError> {
    let usecase = ApproveAdminUseCase {
        admins: state.admin_repo(),
        audit: state.audit(),
    };
    let admin = usecase
        .execute(
            identity,
            ApproveAdminInput {
                provider: body.provider,
                email: body.email,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}
