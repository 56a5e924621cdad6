// FantasyRA backend: static front-end host, liveness probe, and the status
// client that the wiki page uses to report on it.

pub mod api;
pub mod assets;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod server;
