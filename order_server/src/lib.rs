//! # Marketplace order server
//! This crate hosts the HTTP surface over the order engine. It is responsible for:
//! * the order lifecycle endpoints used by the storefront UI (create, fetch, list, transition),
//! * the automation endpoints invoked by collaborators: auto-delivery after a status change,
//!   the cron-invoked lifecycle sweep, seller auto-messages and notification pushes,
//! * the background sweep worker that auto-approves delivered orders past their deadline.
//!
//! ## Configuration
//! The server is configured via `MOS_*` environment variables. See [config](config/index.html).
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod sweep_worker;

#[cfg(test)]
mod endpoint_tests;
