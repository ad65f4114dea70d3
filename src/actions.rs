use crate::classify::{FileClassification, classify_file, is_under_root};
use crate::context::{WorkspaceContext, split_file_path};
use crate::error::{P4Error, P4Result};
use crate::process::{CommandRunner, Invocation};
use crate::session::get_client_root;
use std::fs;
use std::path::Path;
use tracing::debug;

pub(crate) fn is_writable(file: &Path) -> P4Result<bool> {
    let metadata = fs::metadata(file)
        .map_err(|err| P4Error::io(format!("failed to stat {}", file.display()), err))?;
    Ok(!metadata.permissions().readonly())
}

async fn require_tracked<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    file: &Path,
) -> P4Result<()> {
    match classify_file(runner, ctx, file).await? {
        FileClassification::Tracked => Ok(()),
        FileClassification::PendingAdd => Err(P4Error::not_eligible(format!(
            "{} does not exist on disk yet",
            file.display()
        ))),
        FileClassification::Untracked => Err(P4Error::not_eligible(format!(
            "{} is not under the client root",
            file.display()
        ))),
    }
}

async fn run_file_command<R: CommandRunner>(
    runner: &R,
    command: &str,
    file: &Path,
) -> P4Result<String> {
    let (folder, name) = split_file_path(file)?;
    debug!(command, file = %file.display(), "running file action");
    let output = runner
        .run(Invocation::new(&folder, [command, name.as_str()]))
        .await?
        .into_stdout()?;
    Ok(output.trim().to_string())
}

/// `p4 edit`. An already-writable file is not eligible and no p4 process is
/// started for it.
pub async fn checkout<R: CommandRunner>(runner: &R, file: &Path) -> P4Result<String> {
    if file.exists() && is_writable(file)? {
        return Err(P4Error::not_eligible("File is already writable."));
    }
    let ctx = WorkspaceContext::from_file(file)?;
    require_tracked(runner, &ctx, file).await?;
    run_file_command(runner, "edit", file).await
}

pub async fn add<R: CommandRunner>(runner: &R, file: &Path) -> P4Result<String> {
    let ctx = WorkspaceContext::from_file(file)?;
    require_tracked(runner, &ctx, file).await?;
    run_file_command(runner, "add", file).await
}

pub async fn delete<R: CommandRunner>(runner: &R, file: &Path) -> P4Result<String> {
    let ctx = WorkspaceContext::from_file(file)?;
    require_tracked(runner, &ctx, file).await?;
    run_file_command(runner, "delete", file).await
}

/// Also allowed for files missing on disk (reverting an open-for-delete).
pub async fn revert<R: CommandRunner>(runner: &R, file: &Path) -> P4Result<String> {
    let ctx = WorkspaceContext::from_file(file)?;
    if classify_file(runner, &ctx, file).await? == FileClassification::Untracked {
        return Err(P4Error::not_eligible(format!(
            "{} is not under the client root",
            file.display()
        )));
    }
    run_file_command(runner, "revert", file).await
}

/// Raw `p4 diff` text.
pub async fn diff<R: CommandRunner>(runner: &R, file: &Path) -> P4Result<String> {
    let ctx = WorkspaceContext::from_file(file)?;
    require_tracked(runner, &ctx, file).await?;
    let (folder, name) = split_file_path(file)?;
    runner
        .run(Invocation::new(&folder, ["diff", name.as_str()]))
        .await?
        .into_stdout()
}

/// Branches `old` into `new` and opens `old` for delete.
pub async fn rename<R: CommandRunner>(runner: &R, old: &Path, new: &Path) -> P4Result<String> {
    let ctx = WorkspaceContext::from_file(old)?;
    require_tracked(runner, &ctx, old).await?;
    let (old_folder, old_name) = split_file_path(old)?;
    let (new_folder, new_name) = split_file_path(new)?;
    let root = get_client_root(runner, &ctx).await?;
    if !is_under_root(&root, &new_folder) {
        return Err(P4Error::not_eligible(format!(
            "{} is not under the client root",
            new.display()
        )));
    }
    let old_path = old_folder.join(old_name).to_string_lossy().to_string();
    let new_path = new_folder.join(new_name).to_string_lossy().to_string();

    let integrated = runner
        .run(Invocation::new(
            ctx.folder(),
            ["integrate", "-d", "-t", "-Di", "-f", old_path.as_str(), new_path.as_str()],
        ))
        .await?
        .into_stdout()?;
    let deleted = runner
        .run(Invocation::new(
            ctx.folder(),
            ["delete", old_path.as_str(), new_path.as_str()],
        ))
        .await?
        .into_stdout()?;
    Ok([integrated.trim(), deleted.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Clears the stored password and ends the ticket session.
pub async fn logout<R: CommandRunner>(runner: &R, ctx: &WorkspaceContext) -> P4Result<String> {
    runner
        .run(Invocation::new(ctx.folder(), ["set", "P4PASSWD="]))
        .await?
        .into_stdout()?;
    let output = runner
        .run(Invocation::new(ctx.folder(), ["logout"]))
        .await?
        .into_stdout()?;
    Ok(output.trim().to_string())
}

/// Stores `password` for subsequent commands.
pub async fn login<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    password: &str,
) -> P4Result<String> {
    if password.is_empty() {
        return Err(P4Error::not_eligible("password must not be empty"));
    }
    let output = runner
        .run(Invocation::new(
            ctx.folder(),
            ["set".to_string(), format!("P4PASSWD={password}")],
        ))
        .await?
        .into_stdout()?;
    let output = output.trim();
    Ok(if output.is_empty() {
        "password stored".to_string()
    } else {
        output.to_string()
    })
}
