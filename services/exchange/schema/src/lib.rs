pub mod admin_users;
pub mod audit_logs;
pub mod auth_codes;
pub mod events;
pub mod pairings;
pub mod participants;
pub mod system_settings;
