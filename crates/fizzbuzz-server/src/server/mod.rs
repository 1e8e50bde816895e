//! HTTP service around the `fizzbuzz` core.
//!
//! ## Structure
//!
//! - [`config`] - CLI/environment configuration.
//! - [`error`] - request errors and their HTTP mapping.
//! - [`http`] - router, shared state and handlers.
//! - [`telemetry`] - logging and optional OpenTelemetry export.

pub mod config;
pub mod error;
pub mod http;
pub mod telemetry;
