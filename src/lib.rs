//! twinrelay is a two-backend HTTP forwarding proxy.
//!
//! It accepts GET and POST requests on a local port and relays each one
//! to either the auth backend (paths starting with `/auth`) or the main
//! backend (everything else), then returns the backend's status, headers
//! and body to the caller. Transport failures become a `502` with a
//! plain-text `Proxy Error: ...` body.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate).
//! - [`config`] -- Config model, file loading, CLI/env overrides, validation.
//! - [`error`] -- Process-level error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Core forwarding: target selection, header exclusion sets,
//!   and the outbound exchange.
//! - [`server`] -- Axum server setup, shared state, HTTP client, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file formats |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod server;
