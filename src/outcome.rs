use crate::config::Config;
use crate::constants::STATUS_PREFIX;
use crate::error::P4Result;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Success(String),
    /// The action did not run, as expected (file already writable, ...).
    Warning(String),
    Failure(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Warning(message) | Self::Failure(message) => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl From<P4Result<String>> for Outcome {
    fn from(result: P4Result<String>) -> Self {
        match result {
            Ok(message) => Self::Success(message),
            Err(err) if err.is_warning() => Self::Warning(err.to_string()),
            Err(err) => Self::Failure(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Log,
    Status,
    Suppressed,
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    warnings_enabled: bool,
    log_warnings_to_status: bool,
}

impl Reporter {
    pub fn new(warnings_enabled: bool, log_warnings_to_status: bool) -> Self {
        Self {
            warnings_enabled,
            log_warnings_to_status,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.warnings_enabled, config.log_warnings_to_status)
    }

    pub fn route(&self, outcome: &Outcome) -> Route {
        match outcome {
            Outcome::Success(_) => Route::Log,
            Outcome::Warning(_) if !self.warnings_enabled => Route::Suppressed,
            Outcome::Warning(_) | Outcome::Failure(_) if self.log_warnings_to_status => {
                Route::Status
            }
            Outcome::Warning(_) | Outcome::Failure(_) => Route::Log,
        }
    }

    pub fn report(&self, action: &str, outcome: &Outcome) {
        match self.route(outcome) {
            Route::Suppressed => {}
            Route::Status => eprintln!("{STATUS_PREFIX}: {}", first_line(outcome.message())),
            Route::Log => match outcome {
                Outcome::Success(message) => info!(action, "{message}"),
                Outcome::Warning(message) => warn!(action, "{message}"),
                Outcome::Failure(message) => error!(action, "{message}"),
            },
        }
    }
}

pub(crate) fn first_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
