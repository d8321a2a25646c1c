//! HTTP transport for the message ID service.
//!
//! - [`config`]: CLI / environment configuration and generator wiring.
//! - [`handler`]: axum routes.
//! - [`telemetry`]: log subscriber setup.

pub mod config;
pub mod handler;
pub mod telemetry;
