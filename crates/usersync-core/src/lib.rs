//! `usersync-core` — reconcile a declared list of account users against a
//! remote user directory.
//!
//! ```text
//! loader ──▶ resolver ──▶ executor ──▶ AuditSink
//!  (CSV)    (names→ids)   (snapshot, diff, mutate)
//! ```

pub mod audit;
pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod io;
pub mod loader;
pub mod paths;
pub mod resolver;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod testing;

pub use audit::{AuditSink, FileAuditSink, MemoryAuditSink};
pub use directory::{Directory, DirectoryError, DirectoryResult, NewUser, UserUpdate};
pub use error::{Result, UsersyncError};
pub use executor::{execute, ExecuteOptions, ExecutionReport, Executor};
pub use resolver::{resolve, InstallScope, Resolution, ResolutionError};
pub use types::{
    Action, Directive, DirectoryUser, ExecutionOutcome, Member, NamedEntity, Outcome,
    ResolvedDirective,
};
