pub mod admin;
pub mod assignment;
pub mod audit;
pub mod auth_code;
pub mod event;
pub mod messaging;
pub mod ownership;
pub mod participant;
pub mod reveal;
