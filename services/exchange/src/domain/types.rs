use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use santa_domain::admin::AuthProvider;
use santa_domain::event::EventStatus;

/// A gift exchange and its participant-facing policy.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub closure_message: Option<String>,
    pub require_auth_codes: bool,
    pub auth_code_expiry_hours: u32,
    pub hide_pairings_from_admins: bool,
    pub rules: Vec<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Text shown on every reveal page once the event is closed.
    pub fn closure_text(&self) -> String {
        self.closure_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLOSURE_MESSAGE.to_owned())
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country_code: Option<String>,
    /// Capability token for the participant's reveal page. Never changes.
    pub unique_link: String,
    pub moodboard: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One giver → receiver edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub id: Uuid,
    pub event_id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    pub revealed: bool,
    pub revealed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Six-digit access code gating a participant's reveal page.
#[derive(Debug, Clone)]
pub struct AuthCode {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub provider: AuthProvider,
    /// Provider principal. `None` for an approved admin who has not signed in yet.
    pub provider_user_id: Option<String>,
    pub email: Option<String>,
    pub username: String,
    pub is_system_owner: bool,
    pub created_at: DateTime<Utc>,
}

/// Verified profile returned by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
}

/// Identity waiting to be promoted to system owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIdentity {
    pub provider: AuthProvider,
    pub profile: ProviderProfile,
}

#[derive(Debug, Clone)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// `None` for actions taken by the system or by a participant.
    pub admin_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Aggregate numbers that stay visible even in hide-pairings mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EventCounts {
    pub participant_count: usize,
    pub pairing_count: usize,
    pub revealed_count: usize,
}

impl EventCounts {
    pub fn tally(participants: usize, pairings: &[Pairing]) -> Self {
        Self {
            participant_count: participants,
            pairing_count: pairings.len(),
            revealed_count: pairings.iter().filter(|p| p.revealed).count(),
        }
    }
}

/// Outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

/// Outcome of a bulk send. Individual failures never abort the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl DeliveryReport {
    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_failure(&mut self, reason: String) {
        self.failed += 1;
        self.errors.push(reason);
    }
}

/// Smallest group a derangement is generated for.
pub const MIN_PARTICIPANTS: usize = 3;

/// Auth codes are exactly this many ASCII digits.
pub const AUTH_CODE_LEN: usize = 6;

/// Expiry used when an event does not override it.
pub const DEFAULT_AUTH_CODE_EXPIRY_HOURS: u32 = 24;

/// Accepted range for `auth_code_expiry_hours` (one hour to thirty days).
pub const AUTH_CODE_EXPIRY_RANGE: std::ops::RangeInclusive<u32> = 1..=720;

/// Length of the system-owner claim code.
pub const CLAIM_CODE_LEN: usize = 16;

/// How long a pending owner identity is remembered, in seconds.
pub const PENDING_CLAIM_TTL_SECS: u64 = 600;

/// Length of a participant's `unique_link` token.
pub const UNIQUE_LINK_LEN: usize = 32;

/// `system_settings` key holding the claim code.
pub const SYSTEM_OWNER_CODE_KEY: &str = "system_owner_code";

pub const DEFAULT_CLOSURE_MESSAGE: &str =
    "This gift exchange has ended. Thank you for taking part!";
