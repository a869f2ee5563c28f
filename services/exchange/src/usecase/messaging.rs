use serde_json::json;
use uuid::Uuid;

use santa_domain::notification::{Channel, format_phone_number};

use crate::domain::repository::{
    AuditRepository, AuthCodeRepository, EventRepository, Notifier, ParticipantRepository,
};
use crate::domain::types::{AuthCode, DeliveryReport, EmailMessage, Event, Participant};
use crate::error::ExchangeServiceError;
use crate::usecase::audit::AuditRecorder;
use crate::usecase::auth_code::AuthCodeLedger;

/// Public URL of a participant's reveal page.
pub fn pairing_link(base_url: &str, participant: &Participant) -> String {
    format!("{}/pairing/{}", base_url.trim_end_matches('/'), participant.unique_link)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn link_email(participant: &Participant, event: &Event, link: &str) -> EmailMessage {
    let name = escape_html(&participant.name);
    let title = escape_html(&event.title);
    let html = format!(
        "<h1>Secret Santa</h1><h2>{title}</h2>\
         <p>Hello {name}!</p>\
         <p>You've been invited to a Secret Santa gift exchange.</p>\
         <p><a href=\"{link}\">View your pairing</a></p>\
         <p>Or copy this link: <code>{link}</code></p>\
         <p>Remember to keep it secret!</p>"
    );
    let text = format!(
        "Hello {}!\n\nYou've been invited to take part in {}.\n\nView your pairing here: {link}\n\nRemember to keep it secret!",
        participant.name, event.title
    );
    EmailMessage {
        to: participant.email.clone().unwrap_or_default(),
        subject: format!("{} - Your Secret Santa pairing", event.title),
        html,
        text: Some(text),
    }
}

pub fn auth_code_email(
    participant: &Participant,
    event: &Event,
    link: &str,
    code: &AuthCode,
) -> EmailMessage {
    let name = escape_html(&participant.name);
    let title = escape_html(&event.title);
    let expires = code.expires_at.format("%Y-%m-%d %H:%M UTC");
    let html = format!(
        "<h1>Secret Santa</h1><h2>{title}</h2>\
         <p>Hello {name}!</p>\
         <p>Your access code is <strong>{}</strong>. It expires {expires}.</p>\
         <p><a href=\"{link}\">Open your pairing</a> and enter the code.</p>",
        code.code
    );
    let text = format!(
        "Hello {}!\n\nYour access code for {} is {}. It expires {expires}.\n\nOpen your pairing here and enter the code: {link}",
        participant.name, event.title, code.code
    );
    EmailMessage {
        to: participant.email.clone().unwrap_or_default(),
        subject: format!("{} - Your access code", event.title),
        html,
        text: Some(text),
    }
}

pub fn link_whatsapp(participant: &Participant, event: &Event, link: &str) -> String {
    format!(
        "Hello {}! You're part of {}. View your Secret Santa pairing here: {link}",
        participant.name, event.title
    )
}

pub fn auth_code_whatsapp(
    participant: &Participant,
    event: &Event,
    link: &str,
    code: &AuthCode,
) -> String {
    format!(
        "Hello {}! Your access code for {} is {}. Enter it at {link}",
        participant.name, event.title, code.code
    )
}

/// Deliver one message to one participant over `channel`. `Err` carries the
/// per-recipient failure reason.
async fn deliver<N: Notifier>(
    notifier: &N,
    channel: Channel,
    participant: &Participant,
    email: impl FnOnce() -> EmailMessage,
    whatsapp: impl FnOnce() -> String,
) -> Result<(), String> {
    let delivered = match channel {
        Channel::Email => {
            if participant.email.is_none() {
                return Err(format!("{}: no {}", participant.name, channel.contact_kind()));
            }
            notifier.send_email(&email()).await
        }
        Channel::Whatsapp => {
            let Some(phone) = participant.phone_number.as_deref() else {
                return Err(format!("{}: no {}", participant.name, channel.contact_kind()));
            };
            let to = format_phone_number(participant.country_code.as_deref(), phone);
            notifier.send_whatsapp(&to, &whatsapp()).await
        }
    };
    if delivered {
        Ok(())
    } else {
        Err(format!("{}: delivery failed", participant.name))
    }
}

// ── SendParticipantLinks ─────────────────────────────────────────────────────

pub struct SendLinksUseCase<E, P, N, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    N: Notifier,
    A: AuditRepository,
{
    pub events: E,
    pub participants: P,
    pub notifier: N,
    pub audit: AuditRecorder<A>,
    pub base_url: String,
}

impl<E, P, N, A> SendLinksUseCase<E, P, N, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    N: Notifier,
    A: AuditRepository,
{
    pub async fn execute(
        &self,
        event_id: Uuid,
        channel: Channel,
        actor: Uuid,
    ) -> Result<DeliveryReport, ExchangeServiceError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        let participants = self.participants.list_by_event(event.id).await?;

        let mut report = DeliveryReport::default();
        for participant in &participants {
            let link = pairing_link(&self.base_url, participant);
            match deliver(
                &self.notifier,
                channel,
                participant,
                || link_email(participant, &event, &link),
                || link_whatsapp(participant, &event, &link),
            )
            .await
            {
                Ok(()) => report.record_sent(),
                Err(reason) => report.record_failure(reason),
            }
        }

        tracing::info!(event_id = %event.id, ?channel, sent = report.sent, failed = report.failed, "participant links sent");
        self.audit
            .record(
                Some(actor),
                "messaging.send_links",
                "event",
                Some(event.id.to_string()),
                json!({ "channel": channel, "sent": report.sent, "failed": report.failed }),
            )
            .await;
        Ok(report)
    }
}

// ── SendAuthCodes ────────────────────────────────────────────────────────────

pub struct SendAuthCodesUseCase<E, P, C, N, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    C: AuthCodeRepository,
    N: Notifier,
    A: AuditRepository,
{
    pub events: E,
    pub participants: P,
    pub ledger: AuthCodeLedger<C>,
    pub notifier: N,
    pub audit: AuditRecorder<A>,
    pub base_url: String,
}

impl<E, P, C, N, A> SendAuthCodesUseCase<E, P, C, N, A>
where
    E: EventRepository,
    P: ParticipantRepository,
    C: AuthCodeRepository,
    N: Notifier,
    A: AuditRepository,
{
    /// Issues a fresh code per participant, then delivers it with the link.
    pub async fn execute(
        &self,
        event_id: Uuid,
        channel: Channel,
        actor: Uuid,
    ) -> Result<DeliveryReport, ExchangeServiceError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(ExchangeServiceError::EventNotFound)?;
        let participants = self.participants.list_by_event(event.id).await?;

        let mut report = DeliveryReport::default();
        for participant in &participants {
            let code = match self
                .ledger
                .issue(participant.id, event.auth_code_expiry_hours)
                .await
            {
                Ok(code) => code,
                Err(e) => {
                    tracing::warn!(participant_id = %participant.id, error = %e, "failed to issue auth code");
                    report.record_failure(format!("{}: could not issue code", participant.name));
                    continue;
                }
            };
            let link = pairing_link(&self.base_url, participant);
            match deliver(
                &self.notifier,
                channel,
                participant,
                || auth_code_email(participant, &event, &link, &code),
                || auth_code_whatsapp(participant, &event, &link, &code),
            )
            .await
            {
                Ok(()) => report.record_sent(),
                Err(reason) => report.record_failure(reason),
            }
        }

        tracing::info!(event_id = %event.id, ?channel, sent = report.sent, failed = report.failed, "auth codes sent");
        self.audit
            .record(
                Some(actor),
                "messaging.send_auth_codes",
                "event",
                Some(event.id.to_string()),
                json!({ "channel": channel, "sent": report.sent, "failed": report.failed }),
            )
            .await;
        Ok(report)
    }
}

// ── SendTestMessage ──────────────────────────────────────────────────────────

pub struct SendTestMessageUseCase<N: Notifier> {
    pub notifier: N,
}

impl<N: Notifier> SendTestMessageUseCase<N> {
    pub async fn execute(&self, channel: Channel, to: &str) -> Result<(), ExchangeServiceError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(ExchangeServiceError::InvalidRequest("recipient is required"));
        }
        let delivered = match channel {
            Channel::Email => {
                self.notifier
                    .send_email(&EmailMessage {
                        to: to.to_owned(),
                        subject: "Secret Santa test message".to_owned(),
                        html: "<p>Email delivery is working.</p>".to_owned(),
                        text: Some("Email delivery is working.".to_owned()),
                    })
                    .await
            }
            Channel::Whatsapp => {
                self.notifier
                    .send_whatsapp(
                        &format_phone_number(None, to),
                        "Secret Santa test message: WhatsApp delivery is working.",
                    )
                    .await
            }
        };
        if delivered {
            Ok(())
        } else {
            Err(ExchangeServiceError::UpstreamUnavailable)
        }
    }
}
