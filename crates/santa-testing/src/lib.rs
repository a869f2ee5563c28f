//! Test utilities for the gift-exchange services.
//!
//! Import from `[dev-dependencies]` only, never from production code.

pub mod auth;
