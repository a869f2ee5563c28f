//! Signed session tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token grants. A token of one kind is never accepted as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Authenticated administrator session.
    #[serde(rename = "adm")]
    AdminSession,
    /// A participant passed the auth-code gate.
    #[serde(rename = "vfy")]
    VerifiedParticipant,
}

/// Errors returned by [`validate_token`] and [`issue_token`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token kind mismatch")]
    WrongKind,
    #[error("token encoding failed")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field   | Meaning                                            |
/// |---------|----------------------------------------------------|
/// | `sub`   | admin id or participant id (UUID string)           |
/// | `kind`  | [`TokenKind`] wire tag                             |
/// | `owner` | admin holds the system-owner flag (admin only)     |
/// | `exp`   | expiry, seconds since UNIX epoch                   |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub kind: TokenKind,
    #[serde(default)]
    pub owner: bool,
    pub exp: u64,
}

/// Validated token contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub subject: Uuid,
    pub is_system_owner: bool,
    pub expires_at: u64,
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a token of `kind` for `subject`, valid for `ttl_secs`.
///
/// Returns the encoded token and its expiry timestamp.
pub fn issue_token(
    kind: TokenKind,
    subject: Uuid,
    is_system_owner: bool,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), SessionError> {
    let exp = now_secs() + ttl_secs;
    let claims = SessionClaims {
        sub: subject.to_string(),
        kind,
        owner: is_system_owner,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(SessionError::Encoding)?;
    Ok((token, exp))
}

/// Verify signature, expiry and kind, returning the subject.
///
/// HS256 with the library's default 60s leeway.
pub fn validate_token(
    token: &str,
    secret: &str,
    expected: TokenKind,
) -> Result<SessionToken, SessionError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::InvalidSignature,
        _ => SessionError::Malformed,
    })?;

    let claims = data.claims;
    if claims.kind != expected {
        return Err(SessionError::WrongKind);
    }
    let subject = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| SessionError::Malformed)?;
    Ok(SessionToken {
        subject,
        is_system_owner: claims.owner,
        expires_at: claims.exp,
    })
}
