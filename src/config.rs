use crate::constants::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_GRAPHICAL_DIFF_COMMAND, DEFAULT_LINE_SEPARATOR,
    DEFAULT_P4_BIN, MACOS_SHELL_SETUP,
};
use crate::process::P4Runner;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    p4_bin: Option<String>,
    command_timeout_secs: Option<u64>,
    shell_setup: Option<String>,
    auto_checkout: Option<bool>,
    auto_checkout_on_modified: Option<bool>,
    auto_checkout_on_save: Option<bool>,
    auto_add: Option<bool>,
    warnings_enabled: Option<bool>,
    log_warnings_to_status: Option<bool>,
    end_line_separator: Option<String>,
    default_graphical_diff_command: Option<String>,
    selected_graphical_diff_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub p4_bin: String,
    pub command_timeout_secs: u64,
    /// Run before p4 in a shell (login profile sourcing on macOS).
    pub shell_setup: Option<String>,
    pub auto_checkout: bool,
    pub auto_checkout_on_modified: bool,
    pub auto_checkout_on_save: bool,
    pub auto_add: bool,
    pub warnings_enabled: bool,
    /// Send warnings and failures to the one-line status sink instead of the log.
    pub log_warnings_to_status: bool,
    pub end_line_separator: String,
    pub default_graphical_diff_command: String,
    pub selected_graphical_diff_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            p4_bin: DEFAULT_P4_BIN.to_string(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            shell_setup: cfg!(target_os = "macos").then(|| MACOS_SHELL_SETUP.to_string()),
            auto_checkout: true,
            auto_checkout_on_modified: false,
            auto_checkout_on_save: true,
            auto_add: true,
            warnings_enabled: true,
            log_warnings_to_status: false,
            end_line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
            default_graphical_diff_command: DEFAULT_GRAPHICAL_DIFF_COMMAND.to_string(),
            selected_graphical_diff_command: None,
        }
    }
}

impl Config {
    /// First existing config file wins; missing files leave the defaults.
    pub fn load() -> Result<Self> {
        for path in config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: PartialConfig = toml::from_str(raw)?;
        let mut config = Self::default();
        config.apply(parsed);
        Ok(config)
    }

    fn apply(&mut self, parsed: PartialConfig) {
        if let Some(p4_bin) = parsed.p4_bin
            && !p4_bin.trim().is_empty()
        {
            self.p4_bin = p4_bin;
        }
        if let Some(secs) = parsed.command_timeout_secs
            && secs > 0
        {
            self.command_timeout_secs = secs;
        }
        if let Some(setup) = parsed.shell_setup {
            self.shell_setup = Some(setup).filter(|setup| !setup.trim().is_empty());
        }
        if let Some(value) = parsed.auto_checkout {
            self.auto_checkout = value;
        }
        if let Some(value) = parsed.auto_checkout_on_modified {
            self.auto_checkout_on_modified = value;
        }
        if let Some(value) = parsed.auto_checkout_on_save {
            self.auto_checkout_on_save = value;
        }
        if let Some(value) = parsed.auto_add {
            self.auto_add = value;
        }
        if let Some(value) = parsed.warnings_enabled {
            self.warnings_enabled = value;
        }
        if let Some(value) = parsed.log_warnings_to_status {
            self.log_warnings_to_status = value;
        }
        if let Some(separator) = parsed.end_line_separator {
            self.end_line_separator = separator;
        }
        if let Some(command) = parsed.default_graphical_diff_command
            && !command.trim().is_empty()
        {
            self.default_graphical_diff_command = command;
        }
        self.selected_graphical_diff_command = parsed
            .selected_graphical_diff_command
            .filter(|command| !command.trim().is_empty());
    }

    /// The selected viewer when one is set, otherwise the default.
    pub fn graphical_diff_command(&self) -> &str {
        self.selected_graphical_diff_command
            .as_deref()
            .unwrap_or(&self.default_graphical_diff_command)
    }

    pub fn runner(&self) -> P4Runner {
        P4Runner::new(&self.p4_bin)
            .with_timeout(Duration::from_secs(self.command_timeout_secs))
            .with_shell_setup(self.shell_setup.clone())
    }
}

pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("p4act").join("config.toml"));
    }
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".p4act.toml"));
    }
    paths
}
