//! Outbound message channels.

use serde::{Deserialize, Serialize};

/// Delivery channel used to reach a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Whatsapp,
}

impl Channel {
    /// Human name of the contact detail the channel needs.
    pub fn contact_kind(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "phone number",
        }
    }
}

/// Format a phone number for the WhatsApp API: digits of the country code
/// followed by digits of the local number. Country code defaults to `+1`.
pub fn format_phone_number(country_code: Option<&str>, phone_number: &str) -> String {
    let code = country_code.unwrap_or("+1");
    code.chars()
        .chain(phone_number.chars())
        .filter(char::is_ascii_digit)
        .collect()
}
