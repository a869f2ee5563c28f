use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_domain::event::EventStatus;
use santa_domain::pagination::PageRequest;

use santa_exchange::domain::repository::{
    AdminRepository, AuditRepository, AuthCodeRepository, EventRepository, Notifier,
    OwnerClaimRepository, PairingRepository, ParticipantRepository, PendingClaimCache,
};
use santa_exchange::domain::types::{
    AdminUser, AuditLogEntry, AuthCode, DEFAULT_AUTH_CODE_EXPIRY_HOURS, EmailMessage, Event,
    Pairing, Participant, PendingIdentity, ProviderProfile,
};
use santa_exchange::error::ExchangeServiceError;
use santa_exchange::usecase::audit::AuditRecorder;
use santa_exchange::usecase::auth_code::AuthCodeLedger;

// ── MockEventRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockEventRepo {
    pub events: Arc<Mutex<Vec<Event>>>,
}

impl MockEventRepo {
    pub fn with(events: Vec<Event>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events)),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Event> {
        self.events.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }
}

impl EventRepository for MockEventRepo {
    async fn create(&self, event: &Event) -> Result<(), ExchangeServiceError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ExchangeServiceError> {
        Ok(self.get(id))
    }

    async fn list(&self) -> Result<Vec<Event>, ExchangeServiceError> {
        let mut events = self.events.lock().unwrap().clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn update(&self, event: &Event) -> Result<(), ExchangeServiceError> {
        let mut events = self.events.lock().unwrap();
        if let Some(e) = events.iter_mut().find(|e| e.id == event.id) {
            *e = event.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError> {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() != before)
    }
}

// ── MockParticipantRepo ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockParticipantRepo {
    pub participants: Arc<Mutex<Vec<Participant>>>,
}

impl MockParticipantRepo {
    pub fn with(participants: Vec<Participant>) -> Self {
        Self {
            participants: Arc::new(Mutex::new(participants)),
        }
    }
}

impl ParticipantRepository for MockParticipantRepo {
    async fn create(&self, participant: &Participant) -> Result<(), ExchangeServiceError> {
        self.participants.lock().unwrap().push(participant.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, ExchangeServiceError> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_link(
        &self,
        unique_link: &str,
    ) -> Result<Option<Participant>, ExchangeServiceError> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.unique_link == unique_link)
            .cloned())
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Participant>, ExchangeServiceError> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExchangeServiceError> {
        let mut participants = self.participants.lock().unwrap();
        let before = participants.len();
        participants.retain(|p| p.id != id);
        Ok(participants.len() != before)
    }

    async fn update_moodboard(
        &self,
        id: Uuid,
        moodboard: &[String],
    ) -> Result<bool, ExchangeServiceError> {
        let mut participants = self.participants.lock().unwrap();
        match participants.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.moodboard = moodboard.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockPairingRepo ──────────────────────────────────────────────────────────

/// `generation_locked` simulates another replace holding the event lock.
#[derive(Clone, Default)]
pub struct MockPairingRepo {
    pub pairings: Arc<Mutex<Vec<Pairing>>>,
    pub generation_locked: Arc<AtomicBool>,
}

impl MockPairingRepo {
    pub fn lock_generation(&self) {
        self.generation_locked.store(true, Ordering::SeqCst);
    }

    pub fn for_event(&self, event_id: Uuid) -> Vec<Pairing> {
        self.pairings
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect()
    }
}

impl PairingRepository for MockPairingRepo {
    async fn replace_for_event(
        &self,
        event_id: Uuid,
        pairings: &[Pairing],
    ) -> Result<(), ExchangeServiceError> {
        if self.generation_locked.load(Ordering::SeqCst) {
            return Err(ExchangeServiceError::GenerationInProgress);
        }
        let mut stored = self.pairings.lock().unwrap();
        stored.retain(|p| p.event_id != event_id);
        stored.extend_from_slice(pairings);
        Ok(())
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Pairing>, ExchangeServiceError> {
        Ok(self.for_event(event_id))
    }

    async fn find_by_giver(&self, giver_id: Uuid) -> Result<Option<Pairing>, ExchangeServiceError> {
        Ok(self
            .pairings
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.giver_id == giver_id)
            .cloned())
    }

    async fn mark_revealed(
        &self,
        pairing_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError> {
        let mut pairings = self.pairings.lock().unwrap();
        match pairings.iter_mut().find(|p| p.id == pairing_id && !p.revealed) {
            Some(p) => {
                p.revealed = true;
                p.revealed_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockAuthCodeRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAuthCodeRepo {
    pub codes: Arc<Mutex<Vec<AuthCode>>>,
}

impl MockAuthCodeRepo {
    /// Move every code of `participant_id` into the past.
    pub fn expire_all(&self, participant_id: Uuid) {
        let mut codes = self.codes.lock().unwrap();
        for c in codes.iter_mut().filter(|c| c.participant_id == participant_id) {
            c.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }

    pub fn for_participant(&self, participant_id: Uuid) -> Vec<AuthCode> {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.participant_id == participant_id)
            .cloned()
            .collect()
    }
}

impl AuthCodeRepository for MockAuthCodeRepo {
    async fn replace_unverified(&self, code: &AuthCode) -> Result<(), ExchangeServiceError> {
        let mut codes = self.codes.lock().unwrap();
        codes.retain(|c| c.participant_id != code.participant_id || c.verified);
        codes.push(code.clone());
        Ok(())
    }

    async fn find_unverified(
        &self,
        participant_id: Uuid,
        code: &str,
    ) -> Result<Option<AuthCode>, ExchangeServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.participant_id == participant_id && c.code == code && !c.verified)
            .cloned())
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, ExchangeServiceError> {
        let mut codes = self.codes.lock().unwrap();
        match codes.iter_mut().find(|c| c.id == id && !c.verified) {
            Some(c) => {
                c.verified = true;
                c.verified_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockAdminRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAdminRepo {
    pub admins: Arc<Mutex<Vec<AdminUser>>>,
}

impl MockAdminRepo {
    pub fn with(admins: Vec<AdminUser>) -> Self {
        Self {
            admins: Arc::new(Mutex::new(admins)),
        }
    }

    pub fn all(&self) -> Vec<AdminUser> {
        self.admins.lock().unwrap().clone()
    }
}

impl AdminRepository for MockAdminRepo {
    async fn count(&self) -> Result<u64, ExchangeServiceError> {
        Ok(self.admins.lock().unwrap().len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminUser>, ExchangeServiceError> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_user_id: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.provider == provider && a.provider_user_id.as_deref() == Some(provider_user_id)
            })
            .cloned())
    }

    async fn find_by_email(
        &self,
        provider: AuthProvider,
        email: &str,
    ) -> Result<Option<AdminUser>, ExchangeServiceError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.provider == provider && a.email.as_deref() == Some(email))
            .cloned())
    }

    async fn link_identity(
        &self,
        id: Uuid,
        profile: &ProviderProfile,
    ) -> Result<(), ExchangeServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(a) = admins.iter_mut().find(|a| a.id == id) {
            a.provider_user_id = Some(profile.id.clone());
            a.username = profile.username.clone();
        }
        Ok(())
    }

    async fn create(&self, admin: &AdminUser) -> Result<(), ExchangeServiceError> {
        self.admins.lock().unwrap().push(admin.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AdminUser>, ExchangeServiceError> {
        Ok(self.all())
    }
}

// ── MockOwnerClaimRepo ───────────────────────────────────────────────────────

/// Shares the admin list with a [`MockAdminRepo`] so a consumed claim shows up
/// as a stored owner.
#[derive(Clone)]
pub struct MockOwnerClaimRepo {
    pub code: Arc<Mutex<Option<String>>>,
    pub admins: Arc<Mutex<Vec<AdminUser>>>,
}

impl MockOwnerClaimRepo {
    pub fn new(admins: &MockAdminRepo) -> Self {
        Self {
            code: Arc::new(Mutex::new(None)),
            admins: Arc::clone(&admins.admins),
        }
    }

    pub fn stored_code(&self) -> Option<String> {
        self.code.lock().unwrap().clone()
    }
}

impl OwnerClaimRepository for MockOwnerClaimRepo {
    async fn create_if_absent(&self, code: &str) -> Result<bool, ExchangeServiceError> {
        let mut stored = self.code.lock().unwrap();
        if stored.is_some() {
            return Ok(false);
        }
        *stored = Some(code.to_owned());
        Ok(true)
    }

    async fn consume(&self, code: &str, owner: &AdminUser) -> Result<bool, ExchangeServiceError> {
        let mut stored = self.code.lock().unwrap();
        if stored.as_deref() != Some(code) {
            return Ok(false);
        }
        *stored = None;
        self.admins.lock().unwrap().push(owner.clone());
        Ok(true)
    }
}

// ── MockPendingClaimCache ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPendingClaimCache {
    pub entries: Arc<Mutex<HashMap<String, PendingIdentity>>>,
}

impl MockPendingClaimCache {
    /// Simulates the TTL elapsing.
    pub fn expire(&self, claim_id: &str) {
        self.entries.lock().unwrap().remove(claim_id);
    }
}

impl PendingClaimCache for MockPendingClaimCache {
    async fn put(
        &self,
        claim_id: &str,
        identity: &PendingIdentity,
    ) -> Result<(), ExchangeServiceError> {
        self.entries
            .lock()
            .unwrap()
            .insert(claim_id.to_owned(), identity.clone());
        Ok(())
    }

    async fn get(&self, claim_id: &str) -> Result<Option<PendingIdentity>, ExchangeServiceError> {
        Ok(self.entries.lock().unwrap().get(claim_id).cloned())
    }

    async fn remove(&self, claim_id: &str) -> Result<(), ExchangeServiceError> {
        self.entries.lock().unwrap().remove(claim_id);
        Ok(())
    }
}

// ── MockAuditRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAuditRepo {
    pub entries: Arc<Mutex<Vec<AuditLogEntry>>>,
    pub failing: bool,
}

impl MockAuditRepo {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

impl AuditRepository for MockAuditRepo {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), ExchangeServiceError> {
        if self.failing {
            return Err(ExchangeServiceError::UpstreamUnavailable);
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<AuditLogEntry>, ExchangeServiceError> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

/// Records deliveries. Recipients listed in `failing` are rejected.
#[derive(Clone, Default)]
pub struct MockNotifier {
    pub emails: Arc<Mutex<Vec<EmailMessage>>>,
    pub whatsapps: Arc<Mutex<Vec<(String, String)>>>,
    pub failing: Vec<String>,
}

impl MockNotifier {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing: recipients.iter().map(|r| (*r).to_owned()).collect(),
            ..Self::default()
        }
    }
}

impl Notifier for MockNotifier {
    async fn send_email(&self, message: &EmailMessage) -> bool {
        if self.failing.contains(&message.to) {
            return false;
        }
        self.emails.lock().unwrap().push(message.clone());
        true
    }

    async fn send_whatsapp(&self, to: &str, message: &str) -> bool {
        if self.failing.iter().any(|f| f == to) {
            return false;
        }
        self.whatsapps
            .lock()
            .unwrap()
            .push((to.to_owned(), message.to_owned()));
        true
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn audit(repo: &MockAuditRepo) -> AuditRecorder<MockAuditRepo> {
    AuditRecorder { repo: repo.clone() }
}

pub fn ledger(repo: &MockAuthCodeRepo) -> AuthCodeLedger<MockAuthCodeRepo> {
    AuthCodeLedger { repo: repo.clone() }
}

pub fn test_event() -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: "Office party".to_owned(),
        description: None,
        status: EventStatus::Active,
        closure_message: None,
        require_auth_codes: false,
        auth_code_expiry_hours: DEFAULT_AUTH_CODE_EXPIRY_HOURS,
        hide_pairings_from_admins: false,
        rules: vec!["Budget is 20 EUR".to_owned()],
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_participant(event_id: Uuid, name: &str) -> Participant {
    Participant {
        id: Uuid::new_v4(),
        event_id,
        name: name.to_owned(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone_number: None,
        country_code: None,
        unique_link: format!("link-{}", Uuid::new_v4().simple()),
        moodboard: vec![],
        created_at: Utc::now(),
    }
}

pub fn test_participants(event_id: Uuid, names: &[&str]) -> Vec<Participant> {
    names.iter().map(|n| test_participant(event_id, n)).collect()
}

pub fn test_profile(id: &str, email: Option<&str>) -> ProviderProfile {
    ProviderProfile {
        id: id.to_owned(),
        username: format!("user-{id}"),
        email: email.map(str::to_owned),
    }
}

pub fn test_admin(provider: AuthProvider, email: &str, is_system_owner: bool) -> AdminUser {
    AdminUser {
        id: Uuid::new_v4(),
        provider,
        provider_user_id: Some(format!("pid-{}", Uuid::new_v4().simple())),
        email: Some(email.to_owned()),
        username: email.to_owned(),
        is_system_owner,
        created_at: Utc::now(),
    }
}

/// A pairing row stored directly, bypassing generation.
pub fn test_pairing(event_id: Uuid, giver_id: Uuid, receiver_id: Uuid) -> Pairing {
    Pairing {
        id: Uuid::new_v4(),
        event_id,
        giver_id,
        receiver_id,
        revealed: false,
        revealed_at: None,
        created_at: Utc::now(),
    }
}
