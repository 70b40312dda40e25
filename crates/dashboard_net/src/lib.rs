//! # dashboard_net
//!
//! NATS transport layer for the grid operator dashboard.
//!
//! This crate provides:
//!
//! - [`subjects`] — the channel subjects the dashboard listens and publishes on.
//! - [`messages`] — wire shapes of inbound events and outbound commands.
//! - [`connection`] — NATS connection management and the JSON payload codec.
//! - [`error`] — Network-layer error types.

pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;

pub use connection::{NatsConnection, ReconnectWatch, decode, encode};
pub use error::NetError;
pub use subjects::Subjects;
