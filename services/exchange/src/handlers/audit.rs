use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use santa_domain::pagination::PageRequest;
use santa_session::identity::AdminIdentity;

use crate::domain::types::AuditLogEntry;
use crate::error::ExchangeServiceError;
use crate::state::AppState;
use crate::usecase::audit::ListAuditLogsUseCase;

#[derive(Serialize)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub admin_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: serde_json::Value,
    #[serde(serialize_with = "santa_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogResponse {
    fn from(e: AuditLogEntry) -> Self {
        Self {
            id: e.id,
            admin_id: e.admin_id,
            action: e.action,
            resource_type: e.resource_type,
            resource_id: e.resource_id,
            details: e.details,
            created_at: e.created_at,
        }
    }
}

// ── GET /admin/audit-logs ────────────────────────────────────────────────────

pub async fn list_audit_logs(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AuditLogResponse>>, ExchangeServiceError> {
    let usecase = ListAuditLogsUseCase {
        repo: state.audit_repo(),
    };
    let entries = usecase.execute(page).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
