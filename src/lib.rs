//! Eventim → local events API republisher.

pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod infra;
pub mod ledger;
pub mod logging;
pub mod organizer;
pub mod pipeline;
pub mod publish;
pub mod types;
