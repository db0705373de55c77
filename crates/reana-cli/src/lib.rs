//! # reana-cli
//!
//! Command-line client for a remote REANA workflow-execution service.
//!
//! Provides commands for:
//! - Workflow management and execution (create, list, start, stop, logs)
//! - Workspace file management (upload, download, ls, mv, rm)
//! - Secret management and workflow sharing
//! - Quota and cluster information
//!
//! # Architecture
//!
//! The CLI talks to a REANA server over HTTPS/JSON using the typed
//! bindings from `reana-api`. The [`client::ReanaClient`] submits each
//! operation and decodes the answer into the operation's response
//! variant; handlers pattern-match on the variant and feed successes
//! through the filter → format → table → display pipeline.
//!
//! ```text
//! ┌────────────┐      HTTPS/JSON       ┌──────────────┐
//! │ reana-cli  │◄─────────────────────►│ REANA server │
//! └────────────┘  typed ops (reana-api)└──────────────┘
//! ```
//!
//! TLS certificate verification is DISABLED by default: REANA clusters
//! commonly run with self-signed certificates. Pass `--verify-tls` to
//! re-enable it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod format;
pub mod options;
pub mod table;
pub mod validation;
pub mod workflow;

pub use cli::{Cli, Commands};
pub use client::ReanaClient;
pub use config::Context;
pub use error::CliError;
