pub mod cache;
pub mod db;
pub mod identity;
pub mod notifier;
