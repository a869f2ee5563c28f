pub mod admin_auth;
pub mod admins;
pub mod audit;
pub mod auth_code;
pub mod events;
pub mod health;
pub mod messaging;
pub mod pairings;
pub mod participants;
pub mod reveal;
