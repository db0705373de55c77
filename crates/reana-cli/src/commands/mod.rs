//! Command handler implementations.
//!
//! Handlers are uniform: bind flags into typed parameters, call the
//! transport, pipe the typed success variant through the filter → format →
//! table → display pipeline, and translate typed error variants into
//! user-visible messages.

pub mod execution;
pub mod files;
pub mod logs;
pub mod quota;
pub mod retention;
pub mod secrets;
pub mod server;
pub mod sessions;
pub mod share;
pub mod workflows;

pub use execution::{RestartCommand, StartCommand, StatusCommand, StopCommand};
pub use files::{DownloadCommand, LsCommand, MvCommand, RmCommand, UploadCommand};
pub use logs::LogsCommand;
pub use quota::QuotaShowCommand;
pub use retention::{PruneCommand, RetentionRulesListCommand};
pub use secrets::{SecretsAddCommand, SecretsDeleteCommand, SecretsListCommand};
pub use server::{InfoCommand, PingCommand};
pub use sessions::{CloseCommand, OpenCommand};
pub use share::{ShareAddCommand, ShareRemoveCommand, ShareStatusCommand};
pub use workflows::{CreateCommand, DeleteCommand, DiffCommand, ListCommand};
