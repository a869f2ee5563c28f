use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::json;

use crate::config::{EmailSettings, WhatsappSettings};
use crate::domain::repository::Notifier;
use crate::domain::types::EmailMessage;

/// Email and WhatsApp delivery over their HTTP APIs.
///
/// An unconfigured channel reports every send as failed.
#[derive(Clone)]
pub struct HttpNotifier {
    pub client: Client,
    pub email: Option<EmailSettings>,
    pub whatsapp: Option<WhatsappSettings>,
}

impl HttpNotifier {
    pub fn new(
        timeout: Duration,
        email: Option<EmailSettings>,
        whatsapp: Option<WhatsappSettings>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            email,
            whatsapp,
        })
    }
}

/// Plain-text fallback: the HTML with tags removed and entities decoded.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    // `&amp;` last so an escaped entity is decoded only once.
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

impl Notifier for HttpNotifier {
    async fn send_email(&self, message: &EmailMessage) -> bool {
        let Some(settings) = &self.email else {
            tracing::warn!("email delivery is not configured");
            return false;
        };
        let body = json!({
            "from": { "address": settings.from_address, "name": settings.from_name },
            "to": [{ "email_address": { "address": message.to } }],
            "subject": message.subject,
            "htmlbody": message.html,
            "textbody": message.text.clone().unwrap_or_else(|| strip_tags(&message.html)),
        });
        let result = self
            .client
            .post(&settings.api_url)
            .header(AUTHORIZATION, format!("Zoho-enczapikey {}", settings.api_key))
            .json(&body)
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "email API rejected message");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "email API unreachable");
                false
            }
        }
    }

    async fn send_whatsapp(&self, to: &str, message: &str) -> bool {
        let Some(settings) = &self.whatsapp else {
            tracing::warn!("whatsapp delivery is not configured");
            return false;
        };
        let result = self
            .client
            .post(&settings.api_url)
            .bearer_auth(&settings.api_key)
            .json(&json!({ "to": to, "message": message }))
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "whatsapp API rejected message");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "whatsapp API unreachable");
                false
            }
        }
    }
}
