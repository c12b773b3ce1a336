//! Shared wire types and request signing for pitbet.
//!
//! The `client` feature adds typed HTTP clients for the service and admin
//! APIs and a WebSocket subscriber for fight streams.

#![forbid(unsafe_code)]

pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
