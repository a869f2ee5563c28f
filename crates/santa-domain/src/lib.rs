//! Domain types shared across the gift-exchange workspace.
//!
//! Pure types only, no framework dependencies.

pub mod admin;
pub mod event;
pub mod notification;
pub mod pagination;
