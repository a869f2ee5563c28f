//! Cross-cutting service plumbing: health probes, request ids, tracing, serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
