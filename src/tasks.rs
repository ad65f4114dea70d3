use crate::error::{P4Error, P4Result};
use crate::outcome::Outcome;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs `action` on the tokio runtime and hands its outcome to `on_done`.
/// Aborting the returned handle cancels the action.
///
/// `deadline` bounds the whole action (all p4 calls it makes), on top of the
/// per-command timeout of the runner.
pub fn spawn_action<F, C>(
    name: impl Into<String>,
    action: F,
    deadline: Option<Duration>,
    on_done: C,
) -> JoinHandle<()>
where
    F: Future<Output = P4Result<String>> + Send + 'static,
    C: FnOnce(Outcome) + Send + 'static,
{
    let name = name.into();
    tokio::spawn(async move {
        debug!(action = %name, "action started");
        let result = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, action).await {
                Ok(result) => result,
                Err(_) => Err(P4Error::Timeout {
                    command: name.clone(),
                    timeout: deadline,
                }),
            },
            None => action.await,
        };
        debug!(action = %name, ok = result.is_ok(), "action finished");
        on_done(Outcome::from(result));
    })
}
