use crate::constants::DEFAULT_SHELL;
use std::env;

/// Shell used for the login-setup prefix and for graphical diff templates.
pub(crate) fn preferred_shell() -> String {
    env::var("SHELL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

pub(crate) fn shell_join<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| shell_quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || "@%_+=:,./-".contains(ch))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// `setup && line`, or just `line` when the setup is blank.
pub(crate) fn with_setup_prefix(setup: &str, line: &str) -> String {
    let setup = setup.trim();
    if setup.is_empty() {
        return line.to_string();
    }
    format!("{setup} && {line}")
}

/// Replaces each placeholder with its shell-quoted value.
pub(crate) fn expand_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |expanded, (placeholder, value)| {
            expanded.replace(placeholder, &shell_quote(value))
        })
}
