use std::time::Duration;

use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use santa_session::identity::SessionSecret;

use crate::infra::cache::RedisPendingClaimCache;
use crate::infra::db::{
    DbAdminRepository, DbAuditRepository, DbAuthCodeRepository, DbEventRepository,
    DbOwnerClaimRepository, DbPairingRepository, DbParticipantRepository,
};
use crate::infra::identity::HttpIdentityProvider;
use crate::infra::notifier::HttpNotifier;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::auth_code::AuthCodeLedger;
use crate::usecase::ownership::OwnershipBootstrap;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub session_secret: SessionSecret,
    /// Origin for participant links, without a trailing slash.
    pub public_base_url: String,
    pub identity: HttpIdentityProvider,
    pub notifier: HttpNotifier,
    pub upstream_timeout: Duration,
}

impl FromRef<AppState> for SessionSecret {
    fn from_ref(state: &AppState) -> Self {
        state.session_secret.clone()
    }
}

impl AppState {
    pub fn event_repo(&self) -> DbEventRepository {
        DbEventRepository {
            db: self.db.clone(),
        }
    }

    pub fn participant_repo(&self) -> DbParticipantRepository {
        DbParticipantRepository {
            db: self.db.clone(),
        }
    }

    pub fn pairing_repo(&self) -> DbPairingRepository {
        DbPairingRepository {
            db: self.db.clone(),
        }
    }

    pub fn auth_code_repo(&self) -> DbAuthCodeRepository {
        DbAuthCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn admin_repo(&self) -> DbAdminRepository {
        DbAdminRepository {
            db: self.db.clone(),
        }
    }

    pub fn owner_claim_repo(&self) -> DbOwnerClaimRepository {
        DbOwnerClaimRepository {
            db: self.db.clone(),
        }
    }

    pub fn pending_claim_cache(&self) -> RedisPendingClaimCache {
        RedisPendingClaimCache {
            pool: self.redis.clone(),
            timeout: self.upstream_timeout,
        }
    }

    pub fn audit(&self) -> AuditRecorder<DbAuditRepository> {
        AuditRecorder {
            repo: self.audit_repo(),
        }
    }

    pub fn audit_repo(&self) -> DbAuditRepository {
        DbAuditRepository {
            db: self.db.clone(),
        }
    }

    pub fn ledger(&self) -> AuthCodeLedger<DbAuthCodeRepository> {
        AuthCodeLedger {
            repo: self.auth_code_repo(),
        }
    }

    pub fn ownership(
        &self,
    ) -> OwnershipBootstrap<
        DbAdminRepository,
        DbOwnerClaimRepository,
        RedisPendingClaimCache,
        DbAuditRepository,
    > {
        OwnershipBootstrap {
            admins: self.admin_repo(),
            claims: self.owner_claim_repo(),
            pending: self.pending_claim_cache(),
            audit: self.audit(),
        }
    }
}
