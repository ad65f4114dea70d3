pub mod actions;
pub mod changelist;
pub mod classify;
pub mod config;
mod constants;
pub mod context;
pub mod depot;
pub mod error;
pub mod hooks;
pub mod outcome;
pub mod process;
pub mod session;
mod shell;
pub mod spec_block;
pub mod tasks;


pub use changelist::{Changelist, ChangelistId, OpenedFile};
pub use classify::FileClassification;
pub use config::Config;
pub use context::WorkspaceContext;
pub use error::{P4Error, P4Result};
pub use outcome::{Outcome, Reporter};
pub use process::{CmdOutput, CommandRunner, Invocation, P4Runner};
pub use session::Session;
