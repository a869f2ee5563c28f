//! Request extractors backed by the session cookies.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::{ADMIN_SESSION, verified_cookie_name};
use crate::token::{TokenKind, validate_token};

/// HMAC key used to sign and verify every session token.
#[derive(Clone)]
pub struct SessionSecret(Arc<str>);

impl SessionSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Administrator authenticated by a valid `santa_admin_session` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminIdentity {
    pub admin_id: Uuid,
    pub is_system_owner: bool,
}

/// Rejection for a missing, forged or expired admin session.
///
/// Renders the same JSON shape as the service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": "unauthorized",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
    SessionSecret: FromRef<S>,
{
    type Rejection = Unauthenticated;

    // Resolve synchronously and hand back a 'static future; `async fn` here would
    // capture the `parts` lifetime and clash with axum-core's signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = SessionSecret::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let identity = jar
            .get(ADMIN_SESSION)
            .ok_or(Unauthenticated)
            .and_then(|cookie| {
                validate_token(cookie.value(), secret.as_str(), TokenKind::AdminSession).map_err(
                    |e| {
                        tracing::debug!(error = %e, "rejected admin session");
                        Unauthenticated
                    },
                )
            })
            .map(|token| AdminIdentity {
                admin_id: token.subject,
                is_system_owner: token.is_system_owner,
            });

        async move { identity }
    }
}

/// Whether the browser holds a valid verified marker for `participant_id`.
///
/// A marker signed for a different participant does not count.
pub fn participant_verified(jar: &CookieJar, participant_id: Uuid, secret: &SessionSecret) -> bool {
    jar.get(&verified_cookie_name(participant_id))
        .and_then(|cookie| {
            validate_token(
                cookie.value(),
                secret.as_str(),
                TokenKind::VerifiedParticipant,
            )
            .ok()
        })
        .is_some_and(|token| token.subject == participant_id)
}
