use clap::{Parser, Subcommand, ValueEnum};
use p4act::ChangelistId;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "p4act",
    version,
    about = "Perforce checkout, changelist and diff actions for editors"
)]
pub(crate) struct Cli {
    /// Directory whose p4 settings apply to changelist commands (defaults to cwd).
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub(crate) cwd: Option<PathBuf>,
    /// Read settings from this file instead of the default locations.
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum HookKind {
    Modified,
    PreSave,
    PostSave,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Show the p4 user and client root.
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Classify a file as tracked, untracked or pending-add.
    Classify {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Open a file for edit.
    #[command(alias = "edit")]
    Checkout { file: PathBuf },
    /// Open a file for add.
    Add { file: PathBuf },
    /// Open a file for delete.
    Delete { file: PathBuf },
    /// Revert a file.
    Revert { file: PathBuf },
    /// Print `p4 diff` for a file.
    Diff { file: PathBuf },
    /// Print the depot revision of a file without the revision banner.
    Print { file: PathBuf },
    /// Compare a file with its depot revision in the configured diff viewer.
    GraphicalDiff { file: PathBuf },
    /// Rename a file (branch to the new name, delete the old one).
    Rename { old: PathBuf, new: PathBuf },
    /// List pending changelists of the current user.
    Changes {
        /// Include the files opened in each changelist.
        #[arg(long)]
        files: bool,
        #[arg(long)]
        json: bool,
    },
    /// List files opened in a changelist.
    Opened {
        #[arg(default_value = "default")]
        changelist: ChangelistId,
        #[arg(long)]
        json: bool,
    },
    /// Create a new empty changelist.
    NewChange { description: String },
    /// Append a line to a changelist description.
    DescribeAppend {
        changelist: ChangelistId,
        text: String,
    },
    /// Move an opened file to another changelist.
    #[command(alias = "reopen")]
    Move {
        file: PathBuf,
        changelist: ChangelistId,
    },
    Shelve { changelist: ChangelistId },
    Unshelve {
        changelist: ChangelistId,
        /// Do not overwrite writable files.
        #[arg(long)]
        no_force: bool,
    },
    Submit { changelist: ChangelistId },
    /// Store the p4 password (read from stdin when omitted).
    Login { password: Option<String> },
    /// Clear the stored password and log out.
    Logout,
    /// Entry point for editor save/modify hooks.
    Hook {
        #[arg(value_enum)]
        event: HookKind,
        file: PathBuf,
        /// The buffer has unsaved changes (pre-save).
        #[arg(long)]
        dirty: bool,
        /// The file did not exist before this save (post-save).
        #[arg(long)]
        created: bool,
        /// Print the outcome as JSON for the host.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration.
    Config,
}

impl Commands {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Info { .. } => "info",
            Self::Classify { .. } => "classify",
            Self::Checkout { .. } => "checkout",
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Revert { .. } => "revert",
            Self::Diff { .. } => "diff",
            Self::Print { .. } => "print",
            Self::GraphicalDiff { .. } => "graphical-diff",
            Self::Rename { .. } => "rename",
            Self::Changes { .. } => "changes",
            Self::Opened { .. } => "opened",
            Self::NewChange { .. } => "new-change",
            Self::DescribeAppend { .. } => "describe-append",
            Self::Move { .. } => "move",
            Self::Shelve { .. } => "shelve",
            Self::Unshelve { .. } => "unshelve",
            Self::Submit { .. } => "submit",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Hook { .. } => "hook",
            Self::Config => "config",
        }
    }

    /// Queries print their result on stdout; actions only report it.
    pub(crate) fn prints_payload(&self) -> bool {
        matches!(
            self,
            Self::Info { .. }
                | Self::Classify { .. }
                | Self::Diff { .. }
                | Self::Print { .. }
                | Self::Changes { .. }
                | Self::Opened { .. }
                | Self::Config
        )
    }
}
