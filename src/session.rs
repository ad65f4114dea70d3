use crate::constants::{CLIENT_ROOT_LABEL, CLIENT_UNKNOWN_LINE, UNSET_CLIENT_ROOTS, USER_NAME_LABEL};
use crate::context::WorkspaceContext;
use crate::error::{P4Error, P4Result};
use crate::process::{CommandRunner, Invocation};
use serde::Serialize;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tracing::debug;

/// Per-operation view of the p4 session. Built from one `p4 info` call and
/// dropped afterwards; nothing here is cached between actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: String,
    pub client_root: PathBuf,
}

/// Value after `label` on the first line whose trimmed text starts with it.
pub fn label_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

pub fn normalize_separators(path: &str) -> String {
    path.chars()
        .map(|ch| if ch == '/' || ch == '\\' { MAIN_SEPARATOR } else { ch })
        .collect()
}

pub fn parse_user(info: &str) -> P4Result<String> {
    match label_value(info, USER_NAME_LABEL) {
        Some(user) if !user.is_empty() => Ok(user.to_string()),
        _ => Err(P4Error::Parse(format!(
            "`p4 info` did not report a `{USER_NAME_LABEL}` line"
        ))),
    }
}

/// `folder` only feeds the `NoWorkspace` message.
pub fn parse_client_root(info: &str, folder: &str) -> P4Result<PathBuf> {
    let client_unknown = info.lines().any(|line| line.trim() == CLIENT_UNKNOWN_LINE);
    match label_value(info, CLIENT_ROOT_LABEL) {
        _ if client_unknown => Err(P4Error::NoWorkspace(folder.to_string())),
        Some(root) if root.is_empty() || UNSET_CLIENT_ROOTS.contains(&root) => {
            Err(P4Error::NoWorkspace(folder.to_string()))
        }
        Some(root) => Ok(PathBuf::from(normalize_separators(root))),
        None => Err(P4Error::Parse(format!(
            "`p4 info` did not report a `{CLIENT_ROOT_LABEL}` line"
        ))),
    }
}

pub fn parse_session(info: &str, folder: &str) -> P4Result<Session> {
    Ok(Session {
        user: parse_user(info)?,
        client_root: parse_client_root(info, folder)?,
    })
}

async fn run_info<R: CommandRunner>(runner: &R, ctx: &WorkspaceContext) -> P4Result<String> {
    runner
        .run(Invocation::new(ctx.folder(), ["info"]))
        .await?
        .into_stdout()
}

pub async fn get_user<R: CommandRunner>(runner: &R, ctx: &WorkspaceContext) -> P4Result<String> {
    parse_user(&run_info(runner, ctx).await?)
}

pub async fn get_client_root<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
) -> P4Result<PathBuf> {
    let info = run_info(runner, ctx).await?;
    parse_client_root(&info, &ctx.folder().display().to_string())
}

pub async fn inspect<R: CommandRunner>(runner: &R, ctx: &WorkspaceContext) -> P4Result<Session> {
    let info = run_info(runner, ctx).await?;
    let session = parse_session(&info, &ctx.folder().display().to_string())?;
    debug!(
        user = %session.user,
        client_root = %session.client_root.display(),
        "resolved p4 session"
    );
    Ok(session)
}
