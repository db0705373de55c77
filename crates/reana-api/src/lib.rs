//! # reana-api
//!
//! Typed bindings for the REANA server REST API.
//!
//! The crate plays the role usually filled by machine-generated client
//! bindings: for every server operation it declares a parameter struct
//! (path, query and body fields) and a closed response enum with one
//! variant per recognized HTTP status code. The transport layer submits
//! the request and hands `(status, bytes)` to the operation's
//! [`decode`](ops::ListWorkflowsResponse::decode) constructor; handlers
//! then pattern-match on the resulting variant.
//!
//! ```text
//! ┌────────────┐   params / endpoint   ┌──────────────┐
//! │ reana-cli  │──────────────────────►│ REANA server │
//! │            │◄──────────────────────│              │
//! └────────────┘   status + payload    └──────────────┘
//!        │
//!        └── ops::*Response::decode(status, body) → typed variant
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ops;
pub mod types;

pub use error::ApiError;
pub use types::{JobLog, LogBundle, RunStatus, ServerMessage, Workflow};
