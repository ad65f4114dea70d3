use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum P4Error {
    /// The command wrote to its error stream (or exited non-zero).
    #[error("{0}")]
    Backend(String),

    /// Expected label or section missing from otherwise successful output.
    #[error("unexpected p4 output: {0}")]
    Parse(String),

    /// `p4 info` reported no usable client workspace.
    #[error("no Perforce client workspace is configured for {0}")]
    NoWorkspace(String),

    #[error("{0}")]
    NotEligible(String),

    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl P4Error {
    pub fn not_eligible(message: impl Into<String>) -> Self {
        Self::NotEligible(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Warning-level errors never surface as hard failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NotEligible(_))
    }

    /// Machine-readable code for logging and `--json` output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Parse(_) => "parse",
            Self::NoWorkspace(_) => "no_workspace",
            Self::NotEligible(_) => "not_eligible",
            Self::Timeout { .. } => "timeout",
            Self::Spawn { .. } => "spawn",
            Self::Io { .. } => "io",
        }
    }
}

pub type P4Result<T> = Result<T, P4Error>;
