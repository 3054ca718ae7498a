//! commute-cache - offline cache proxy for the commute tracker
//!
//! Pre-caches the app shell at install, drops old cache generations at
//! activation, and answers requests network-first for the API and
//! cache-first for everything else.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod http;
pub mod journal;
pub mod messages;
pub mod network;
pub mod notify;
pub mod proxy;
pub mod registration;
pub mod store;
pub mod ui;

#[cfg(test)]
mod testing;

pub use error::{ProxyError, ProxyResult};
