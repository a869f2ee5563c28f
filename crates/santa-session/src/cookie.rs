//! Cookie builders for every value the service keeps in the browser.
//!
//! All cookies are host-only, `HttpOnly`, `Secure` and `SameSite=Lax`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

/// Signed administrator session.
pub const ADMIN_SESSION: &str = "santa_admin_session";

/// Opaque handle to the identity waiting on an ownership claim.
pub const PENDING_CLAIM: &str = "santa_pending_claim";

/// OAuth `state` nonce, checked on the provider callback.
pub const OAUTH_STATE: &str = "santa_oauth_state";

/// Administrator session lifetime in seconds (7 days).
pub const ADMIN_SESSION_EXP: u64 = 604_800;

/// Verified-participant marker lifetime in seconds (365 days).
pub const VERIFIED_MARKER_EXP: u64 = 31_536_000;

/// Pending ownership-claim lifetime in seconds (10 minutes).
pub const PENDING_CLAIM_EXP: u64 = 600;

/// OAuth round-trip lifetime in seconds (10 minutes).
pub const OAUTH_STATE_EXP: u64 = 600;

/// Cookie name of the verified marker for one participant.
pub fn verified_cookie_name(participant_id: Uuid) -> String {
    format!("santa_verified_{participant_id}")
}

fn build(name: impl Into<String>, value: impl Into<String>, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name.into(), value.into()))
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

fn expired(name: impl Into<String>) -> Cookie<'static> {
    build(name, "", 0)
}

/// Set the signed admin session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use santa_session::cookie::{ADMIN_SESSION, set_admin_session_cookie};
///
/// let jar = set_admin_session_cookie(CookieJar::new(), "token".to_owned());
/// let cookie = jar.get(ADMIN_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_admin_session_cookie(jar: CookieJar, token: String) -> CookieJar {
    jar.add(build(ADMIN_SESSION, token, ADMIN_SESSION_EXP))
}

pub fn clear_admin_session_cookie(jar: CookieJar) -> CookieJar {
    jar.add(expired(ADMIN_SESSION))
}

/// Remember that `participant_id` passed the auth-code gate.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use santa_session::cookie::{set_verified_cookie, verified_cookie_name};
/// use uuid::Uuid;
///
/// let id = Uuid::new_v4();
/// let jar = set_verified_cookie(CookieJar::new(), id, "signed".to_owned());
/// let cookie = jar.get(&verified_cookie_name(id)).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(31536000)));
/// ```
pub fn set_verified_cookie(jar: CookieJar, participant_id: Uuid, token: String) -> CookieJar {
    jar.add(build(
        verified_cookie_name(participant_id),
        token,
        VERIFIED_MARKER_EXP,
    ))
}

pub fn set_pending_claim_cookie(jar: CookieJar, claim_id: String) -> CookieJar {
    jar.add(build(PENDING_CLAIM, claim_id, PENDING_CLAIM_EXP))
}

pub fn clear_pending_claim_cookie(jar: CookieJar) -> CookieJar {
    jar.add(expired(PENDING_CLAIM))
}

pub fn set_oauth_state_cookie(jar: CookieJar, state: String) -> CookieJar {
    jar.add(build(OAUTH_STATE, state, OAUTH_STATE_EXP))
}

pub fn clear_oauth_state_cookie(jar: CookieJar) -> CookieJar {
    jar.add(expired(OAUTH_STATE))
}
