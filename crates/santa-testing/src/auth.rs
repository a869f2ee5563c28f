//! Signed session cookies for router tests.
//!
//! Handlers authenticate administrators and verified participants from
//! cookies, so tests mint the same signed tokens the service would.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use uuid::Uuid;

use santa_session::cookie::{ADMIN_SESSION, verified_cookie_name};
use santa_session::token::{TokenKind, issue_token};

/// Secret shared by tests that build both the router state and the cookies.
pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-router-tests";

/// Administrator identity injected into test requests.
pub struct MockAdmin {
    pub admin_id: Uuid,
    pub is_system_owner: bool,
}

impl MockAdmin {
    pub fn new(admin_id: Uuid, is_system_owner: bool) -> Self {
        Self {
            admin_id,
            is_system_owner,
        }
    }

    pub fn owner() -> Self {
        Self::new(Uuid::new_v4(), true)
    }

    pub fn approved() -> Self {
        Self::new(Uuid::new_v4(), false)
    }

    /// `Cookie` header carrying a signed admin session.
    pub fn headers(&self) -> HeaderMap {
        let (token, _) = issue_token(
            TokenKind::AdminSession,
            self.admin_id,
            self.is_system_owner,
            60,
            TEST_SESSION_SECRET,
        )
        .unwrap();
        cookie_headers(&format!("{ADMIN_SESSION}={token}"))
    }
}

/// `Cookie` header carrying a verified marker for `participant_id`.
pub fn verified_participant_headers(participant_id: Uuid) -> HeaderMap {
    let (token, _) = issue_token(
        TokenKind::VerifiedParticipant,
        participant_id,
        false,
        60,
        TEST_SESSION_SECRET,
    )
    .unwrap();
    cookie_headers(&format!("{}={token}", verified_cookie_name(participant_id)))
}

fn cookie_headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(COOKIE, HeaderValue::from_str(value).unwrap());
    map
}
