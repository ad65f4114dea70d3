use crate::actions::{add, checkout};
use crate::config::Config;
use crate::error::{P4Error, P4Result};
use crate::process::CommandRunner;
use std::path::Path;

/// Editor buffer events the host forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Modified,
    PreSave { dirty: bool },
    /// `created` is true when the file did not exist before this save.
    PostSave { created: bool },
}

fn disabled(option: &str) -> P4Error {
    P4Error::not_eligible(format!("{option} is disabled"))
}

pub async fn handle_event<R: CommandRunner>(
    runner: &R,
    config: &Config,
    event: HookEvent,
    file: &Path,
) -> P4Result<String> {
    match event {
        HookEvent::Modified => {
            if !config.auto_checkout {
                return Err(disabled("auto_checkout"));
            }
            if !config.auto_checkout_on_modified {
                return Err(disabled("auto_checkout_on_modified"));
            }
            checkout(runner, file).await
        }
        HookEvent::PreSave { dirty } => {
            if !config.auto_checkout {
                return Err(disabled("auto_checkout"));
            }
            if !config.auto_checkout_on_save {
                return Err(disabled("auto_checkout_on_save"));
            }
            if !dirty {
                return Err(P4Error::not_eligible("File is not dirty."));
            }
            checkout(runner, file).await
        }
        HookEvent::PostSave { created } => {
            if !config.auto_add {
                return Err(disabled("auto_add"));
            }
            if !created {
                return Err(P4Error::not_eligible("File already existed before the save."));
            }
            add(runner, file).await
        }
    }
}
