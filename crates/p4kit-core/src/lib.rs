//! Structured Perforce operations driven through the `p4` command line.

pub mod branch_copy;
pub mod changelist;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod escape;
pub mod invoke;
pub mod paths;
pub mod spec;

pub use branch_copy::temp_branch_name;
pub use changelist::validate_changelist_id;
pub use client::P4;
pub use connection::{Connection, ConnectionSettings};
pub use error::P4Error;
pub use escape::view_escape;
pub use invoke::{CommandResult, CommandRunner};
pub use paths::WherePaths;
pub use spec::{BranchSpec, ChangelistSpec, ViewEntry};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
