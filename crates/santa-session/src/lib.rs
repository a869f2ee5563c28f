//! Session carrier for the gift-exchange service.
//!
//! Everything a browser carries between requests lives here: signed admin
//! sessions, per-participant "verified" markers, the pending ownership-claim
//! handle and the OAuth `state` nonce. Tokens are HS256 JWTs so tampering is
//! detected and expiry is enforced on every read.

pub mod cookie;
pub mod identity;
pub mod token;
