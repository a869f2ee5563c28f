use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use santa_domain::pagination::PageRequest;

use crate::domain::repository::AuditRepository;
use crate::domain::types::AuditLogEntry;
use crate::error::ExchangeServiceError;

// ── AuditRecorder ────────────────────────────────────────────────────────────

/// Append-only log of privileged actions.
///
/// Recording never fails from the caller's point of view: a storage error is
/// logged and dropped so the audited action still completes.
pub struct AuditRecorder<R: AuditRepository> {
    pub repo: R,
}

impl<R: AuditRepository> AuditRecorder<R> {
    pub async fn record(
        &self,
        actor: Option<Uuid>,
        action: &str,
        resource_type: &str,
        resource_id: Option<String>,
        details: Value,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            admin_id: actor,
            action: action.to_owned(),
            resource_type: resource_type.to_owned(),
            resource_id,
            details,
            created_at: Utc::now(),
        };
        if let Err(e) = self.repo.append(&entry).await {
            tracing::warn!(error = %e, action, resource_type, "failed to record audit entry");
        }
    }
}

// ── ListAuditLogs ────────────────────────────────────────────────────────────

pub struct ListAuditLogsUseCase<R: AuditRepository> {
    pub repo: R,
}

impl<R: AuditRepository> ListAuditLogsUseCase<R> {
    pub async fn execute(
        &self,
        page: PageRequest,
    ) -> Result<Vec<AuditLogEntry>, ExchangeServiceError> {
        self.repo.list(page.clamped()).await
    }
}
