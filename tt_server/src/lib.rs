//! Session server library.
//!
//! Exposes the router and ambient plumbing so integration tests can run
//! the server in-process.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
