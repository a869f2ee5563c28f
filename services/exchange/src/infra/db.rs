use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, Value,
};
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_domain::event::EventStatus;
use santa_domain::pagination::PageRequest;
use santa_exchange_schema::{
    admin_users, audit_logs, auth_codes, events, pairings, participants, system_settings,
};

use crate::domain::repository::{
    AdminRepository, AuditRepository, AuthCodeRepository, EventRepository, OwnerClaimRepository,
    PairingRepository, ParticipantRepository,
};
use crate::domain::types::{
    AdminUser, AuditLogEntry, AuthCode, Event, Pairing, Participant, ProviderProfile,
    SYSTEM_OWNER_CODE_KEY,
};
use crate::error::ExchangeServiceError;

/// Attach context to a database error. Connection failures are retryable and
/// surface as `UpstreamUnavailable`; everything else is internal.
trait StoreContext<T> {
    fn store_context(self, context: &'static str) -> Result<T, ExchangeServiceError>;
}

impl<T> StoreContext<T> for Result<T, DbErr> {
    fn store_context(self, context: &'static str) -> Result<T, ExchangeServiceError> {
        self.map_err(|e| match e {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
                tracing::warn!(error = %e, context, "data store unavailable");
                ExchangeServiceError::UpstreamUnavailable
            }
            other => ExchangeServiceError::Internal(anyhow::Error::new(other).context(context)),
        })
    }
}

fn strings_to_json(items: &[String]) -> serde_json::Value {
    serde_json::Value::from(items.to_vec())
}

fn strings_from_json(value: Option<serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

// ── Event repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

impl EventRepository for DbEventRepository {
    async fn create(&self, event: &Event) -> Result<(), ExchangeServiceError> {
        event_to_active(event)
            .insert(&self.db)
            .await
            .store_context("create event")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ExchangeServiceError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .store_context("find event by id")?;
        model.map(event_from_model).transpose()
    }

    async fn list(&self) -> Result<Vec<Event>, ExchangeServiceError> {
        let models = events::Entity::find()
            .order_by_desc(events::Column::CreatedAt)
            .all(&self.db)
            .await
            .store_context("list events")?;
        models.into_iter().map(event_from_model).collect()
    }

    async fn update(&self, event: &Event) -> Result<(), ExchangeServiceError> {
        event_to_active(event)
            .update(&self.db)
            .await
            .store_context("update event")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError> {
        let result = events::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .store_context("delete event")?;
        Ok(result.rows_affected > 0)
    }
}

fn event_to_active(event: &Event) -> events::ActiveModel {
    events::ActiveModel {
        id: Set(event.id),
        title: Set(event.title.clone()),
        description: Set(event.description.clone()),
        status: Set(event.status.as_str().to_owned()),
        closure_message: Set(event.closure_message.clone()),
        require_auth_codes: Set(event.require_auth_codes),
        auth_code_expiry_hours: Set(event.auth_code_expiry_hours as i32),
        hide_pairings_from_admins: Set(event.hide_pairings_from_admins),
        rules: Set(strings_to_json(&event.rules)),
        created_by: Set(event.created_by),
        created_at: Set(event.created_at),
        updated_at: Set(event.updated_at),
    }
}

fn event_from_model(model: events::Model) -> Result<Event, ExchangeServiceError> {
    let status = model
        .status
        .parse::<EventStatus>()
        .with_context(|| format!("event {} has corrupt status", model.id))?;
    Ok(Event {
        id: model.id,
        title: model.title,
        description: model.description,
        status,
        closure_message: model.closure_message,
        require_auth_codes: model.require_auth_codes,
        auth_code_expiry_hours: u32::try_from(model.auth_code_expiry_hours).unwrap_or(24),
        hide_pairings_from_admins: model.hide_pairings_from_admins,
        rules: strings_from_json(Some(model.rules)),
        created_by: model.created_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Participant repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbParticipantRepository {
    pub db: DatabaseConnection,
}

impl ParticipantRepository for DbParticipantRepository {
    async fn create(&self, participant: &Participant) -> Result<(), ExchangeServiceError> {
        participants::ActiveModel {
            id: Set(participant.id),
            event_id: Set(participant.event_id),
            name: Set(participant.name.clone()),
            email: Set(participant.email.clone()),
            phone_number: Set(participant.phone_number.clone()),
            country_code: Set(participant.country_code.clone()),
            unique_link: Set(participant.unique_link.clone()),
            moodboard: Set(None),
            created_at: Set(participant.created_at),
        }
        .insert(&self.db)
        .await
        .store_context("create participant")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, ExchangeServiceError> {
        let model = participants::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .store_context("find participant by id")?;
        Ok(model.map(participant_from_model))
    }

    async fn find_by_link(
        &self,
        unique_link: &str,
    ) -> Result<Option<Participant>, ExchangeServiceError> {
        let model = participants::Entity::find()
            .filter(participants::Column::UniqueLink.eq(unique_link))
            .one(&self.db)
            .await
            .store_context("find participant by link")?;
        Ok(model.map(participant_from_model))
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Participant>, ExchangeServiceError> {
        let models = participants::Entity::find()
            .filter(participants::Column::EventId.eq(event_id))
            .order_by_asc(participants::Column::CreatedAt)
            .order_by_asc(participants::Column::Id)
            .all(&self.db)
            .await
            .store_context("list participants by event")?;
        Ok(models.into_iter().map(participant_from_model).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError> {
        let result = participants::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .store_context("delete participant")?;
        Ok(result.rows_affected > 0)
    }

    async fn update_moodboard(
        &self,
        id: Uuid,
        moodboard: &[String],
    ) -> Result<bool, ExchangeServiceError> {
        let result = participants::Entity::update_many()
            .col_expr(
                participants::Column::Moodboard,
                Expr::value(strings_to_json(moodboard)),
            )
            .filter(participants::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .store_context("update moodboard")?;
        Ok(result.rows_affected > 0)
    }
}

fn participant_from_model(model: participants::Model) -> Participant {
    Participant {
        id: model.id,
        event_id: model.event_id,
        name: model.name,
        email: model.email,
        phone_number: model.phone_number,
        country_code: model.country_code,
        unique_link: model.unique_link,
        moodboard: strings_from_json(model.moodboard),
        created_at: model.created_at,
    }
}

// ── Pairing repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPairingRepository {
    pub db: DatabaseConnection,
}

/// Advisory-lock key for an event: the first eight bytes of its id.
fn generation_lock_key(event_id: Uuid) -> i64 {
    let bytes = event_id.as_bytes();
    let mut key = [0u8; 8];
    key.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(key)
}

impl PairingRepository for DbPairingRepository {
    async fn replace_for_event(
        &self,
        event_id: Uuid,
        pairings: &[Pairing],
    ) -> Result<(), ExchangeServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .store_context("begin pairing replace")?;

        // Held until commit or rollback.
        let locked = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT pg_try_advisory_xact_lock($1) AS locked",
                [Value::from(generation_lock_key(event_id))],
            ))
            .await
            .store_context("take generation lock")?
            .map(|row| row.try_get::<bool>("", "locked"))
            .transpose()
            .store_context("read generation lock")?
            .unwrap_or(false);
        if !locked {
            txn.rollback().await.store_context("release pairing replace")?;
            return Err(ExchangeServiceError::GenerationInProgress);
        }

        pairings::Entity::delete_many()
            .filter(pairings::Column::EventId.eq(event_id))
            .exec(&txn)
            .await
            .store_context("delete old pairings")?;

        if !pairings.is_empty() {
            pairings::Entity::insert_many(pairings.iter().map(|p| pairings::ActiveModel {
                id: Set(p.id),
                event_id: Set(p.event_id),
                giver_id: Set(p.giver_id),
                receiver_id: Set(p.receiver_id),
                revealed: Set(p.revealed),
                revealed_at: Set(p.revealed_at),
                created_at: Set(p.created_at),
            }))
            .exec(&txn)
            .await
            .store_context("insert pairings")?;
        }

        txn.commit().await.store_context("commit pairing replace")?;
        Ok(())
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Pairing>, ExchangeServiceError> {
        let models = pairings::Entity::find()
            .filter(pairings::Column::EventId.eq(event_id))
            .order_by_asc(pairings::Column::CreatedAt)
            .order_by_asc(pairings::Column::Id)
            .all(&self.db)
            .await
            .store_context("list pairings by event")?;
        Ok(models.into_iter().map(pairing_from_model).collect())
    }

    async fn find_by_giver(&self, giver_id: Uuid) -> Result<Option<Pairing>, ExchangeServiceError> {
        let model = pairings::Entity::find()
            .filter(pairings::Column::GiverId.eq(giver_id))
            .one(&self.db)
            .await
            .store_context("find pairing by giver")?;
        Ok(model.map(pairing_from_model))
    }

    async fn mark_revealed(
        &self,
        pairing_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError> {
        let result = pairings::Entity::update_many()
            .col_expr(pairings::Column::Revealed, Expr::value(true))
            .col_expr(pairings::Column::RevealedAt, Expr::value(at))
            .filter(pairings::Column::Id.eq(pairing_id))
            .filter(pairings::Column::Revealed.eq(false))
            .exec(&self.db)
            .await
            .store_context("mark pairing revealed")?;
        Ok(result.rows_affected == 1)
    }
}

fn pairing_from_model(model: pairings::Model) -> Pairing {
    Pairing {
        id: model.id,
        event_id: model.event_id,
        giver_id: model.giver_id,
        receiver_id: model.receiver_id,
        revealed: model.revealed,
        revealed_at: model.revealed_at,
        created_at: model.created_at,
    }
}

// ── AuthCode repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthCodeRepository {
    pub db: DatabaseConnection,
}

impl AuthCodeRepository for DbAuthCodeRepository {
    async fn replace_unverified(&self, code: &AuthCode) -> Result<(), ExchangeServiceError> {
        let txn = self.db.begin().await.store_context("begin auth code issue")?;

        // Serializes concurrent issues for the same participant.
        let participant = participants::Entity::find_by_id(code.participant_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .store_context("lock participant")?;
        if participant.is_none() {
            return Err(ExchangeServiceError::ParticipantNotFound);
        }

        auth_codes::Entity::delete_many()
            .filter(auth_codes::Column::ParticipantId.eq(code.participant_id))
            .filter(auth_codes::Column::Verified.eq(false))
            .exec(&txn)
            .await
            .store_context("delete unverified auth codes")?;

        auth_codes::ActiveModel {
            id: Set(code.id),
            participant_id: Set(code.participant_id),
            code: Set(code.code.clone()),
            expires_at: Set(code.expires_at),
            verified: Set(false),
            verified_at: Set(None),
            created_at: Set(code.created_at),
        }
        .insert(&txn)
        .await
        .store_context("insert auth code")?;

        txn.commit().await.store_context("commit auth code issue")?;
        Ok(())
    }

    async fn find_unverified(
        &self,
        participant_id: Uuid,
        code: &str,
    ) -> Result<Option<AuthCode>, ExchangeServiceError> {
        let model = auth_codes::Entity::find()
            .filter(auth_codes::Column::ParticipantId.eq(participant_id))
            .filter(auth_codes::Column::Code.eq(code))
            .filter(auth_codes::Column::Verified.eq(false))
            .one(&self.db)
            .await
            .store_context("find unverified auth code")?;
        Ok(model.map(auth_code_from_model))
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError> {
        let result = auth_codes::Entity::update_many()
            .col_expr(auth_codes::Column::Verified, Expr::value(true))
            .col_expr(auth_codes::Column::VerifiedAt, Expr::value(at))
            .filter(auth_codes::Column::Id.eq(id))
            .filter(auth_codes::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .store_context("mark auth code verified")?;
        Ok(result.rows_affected == 1)
    }
}

fn auth_code_from_model(model: auth_codes::Model) -> AuthCode {
    AuthCode {
        id: model.id,
        participant_id: model.participant_id,
        code: model.code,
        expires_at: model.expires_at,
        verified: model.verified,
        verified_at: model.verified_at,
        created_at: model.created_at,
    }
}

// ── Admin repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAdminRepository {
    pub db: DatabaseConnection,
}

impl AdminRepository for DbAdminRepository {
    async fn count(&self) -> Result<u64, ExchangeServiceError> {
        admin_users::Entity::find()
            .count(&self.db)
            .await
            .store_context("count admins")
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminUser>, ExchangeServiceError> {
        let model = admin_users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .store_context("find admin by id")?;
        model.map(admin_from_model).transpose()
    }

    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_user_id: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError> {
        let model = admin_users::Entity::find()
            .filter(admin_users::Column::Provider.eq(provider.as_str()))
            .filter(admin_users::Column::ProviderUserId.eq(provider_user_id))
            .one(&self.db)
            .await
            .store_context("find admin by provider identity")?;
        model.map(admin_from_model).transpose()
    }

    async fn find_by_email(
        &self,
        provider: AuthProvider,
        email: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError> {
        let model = admin_users::Entity::find()
            .filter(admin_users::Column::Provider.eq(provider.as_str()))
            .filter(admin_users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .store_context("find admin by email")?;
        model.map(admin_from_model).transpose()
    }

    async fn link_identity(
        &self,
        id: Uuid,
        profile: &ProviderProfile,
    ) -> Result<(), ExchangeServiceError> {
        admin_users::ActiveModel {
            id: Set(id),
            provider_user_id: Set(Some(profile.id.clone())),
            username: Set(profile.username.clone()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .store_context("link admin identity")?;
        Ok(())
    }

    async fn create(&self, admin: &AdminUser) -> Result<(), ExchangeServiceError> {
        admin_to_active(admin)
            .insert(&self.db)
            .await
            .store_context("create admin")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AdminUser>, ExchangeServiceError> {
        let models = admin_users::Entity::find()
            .order_by_asc(admin_users::Column::CreatedAt)
            .all(&self.db)
            .await
            .store_context("list admins")?;
        models.into_iter().map(admin_from_model).collect()
    }
}

fn admin_to_active(admin: &AdminUser) -> admin_users::ActiveModel {
    admin_users::ActiveModel {
        id: Set(admin.id),
        provider: Set(admin.provider.as_str().to_owned()),
        provider_user_id: Set(admin.provider_user_id.clone()),
        email: Set(admin.email.clone()),
        username: Set(admin.username.clone()),
        is_system_owner: Set(admin.is_system_owner),
        created_at: Set(admin.created_at),
    }
}

fn admin_from_model(model: admin_users::Model) -> Result<AdminUser, ExchangeServiceError> {
    let provider = model
        .provider
        .parse::<AuthProvider>()
        .with_context(|| format!("admin {} has corrupt provider", model.id))?;
    Ok(AdminUser {
        id: model.id,
        provider,
        provider_user_id: model.provider_user_id,
        email: model.email,
        username: model.username,
        is_system_owner: model.is_system_owner,
        created_at: model.created_at,
    })
}

// ── Owner claim repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOwnerClaimRepository {
    pub db: DatabaseConnection,
}

impl OwnerClaimRepository for DbOwnerClaimRepository {
    async fn create_if_absent(&self, code: &str) -> Result<bool, ExchangeServiceError> {
        let inserted = system_settings::Entity::insert(system_settings::ActiveModel {
            key: Set(SYSTEM_OWNER_CODE_KEY.to_owned()),
            value: Set(code.to_owned()),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(system_settings::Column::Key)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .store_context("create owner claim")?;
        Ok(inserted == 1)
    }

    async fn consume(&self, code: &str, owner: &AdminUser) -> Result<bool, ExchangeServiceError> {
        let txn = self.db.begin().await.store_context("begin owner claim")?;

        // Compare-and-delete: a concurrent claimant blocks on the row and then
        // finds nothing to delete.
        let deleted = system_settings::Entity::delete_many()
            .filter(system_settings::Column::Key.eq(SYSTEM_OWNER_CODE_KEY))
            .filter(system_settings::Column::Value.eq(code))
            .exec(&txn)
            .await
            .store_context("consume owner claim")?;
        if deleted.rows_affected != 1 {
            txn.rollback().await.store_context("abort owner claim")?;
            return Ok(false);
        }

        admin_to_active(owner)
            .insert(&txn)
            .await
            .store_context("create system owner")?;
        txn.commit().await.store_context("commit owner claim")?;
        Ok(true)
    }
}

// ── Audit repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditRepository {
    pub db: DatabaseConnection,
}

impl AuditRepository for DbAuditRepository {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), ExchangeServiceError> {
        audit_logs::ActiveModel {
            id: Set(entry.id),
            admin_id: Set(entry.admin_id),
            action: Set(entry.action.clone()),
            resource_type: Set(entry.resource_type.clone()),
            resource_id: Set(entry.resource_id.clone()),
            details: Set(entry.details.clone()),
            created_at: Set(entry.created_at),
        }
        .insert(&self.db)
        .await
        .store_context("append audit entry")?;
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<AuditLogEntry>, ExchangeServiceError> {
        let models = audit_logs::Entity::find()
            .order_by_desc(audit_logs::Column::CreatedAt)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.db)
            .await
            .store_context("list audit entries")?;
        Ok(models
            .into_iter()
            .map(|m| AuditLogEntry {
                id: m.id,
                admin_id: m.admin_id,
                action: m.action,
                resource_type: m.resource_type,
                resource_id: m.resource_id,
                details: m.details,
                created_at: m.created_at,
            })
            .collect())
    }
}
