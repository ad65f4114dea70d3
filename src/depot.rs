use crate::constants::{
    DEPOT_FILE_NAME_PLACEHOLDER, DEPOT_FILE_PATH_PLACEHOLDER, DEPOT_TEMP_PREFIX,
    LOCAL_FILE_NAME_PLACEHOLDER, LOCAL_FILE_PATH_PLACEHOLDER,
};
use crate::context::{WorkspaceContext, split_file_path};
use crate::error::{P4Error, P4Result};
use crate::process::{CommandRunner, Invocation, run_shell_line};
use crate::shell::expand_template;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Drops the `//depot/foo#3 - edit change 12 (text)` banner `p4 print` puts
/// on the first line and rejoins the content with `separator`.
pub fn normalize_print_output(raw: &str, separator: &str) -> String {
    raw.lines().skip(1).collect::<Vec<_>>().join(separator)
}

pub async fn fetch_and_normalize<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    filename: &str,
    separator: &str,
) -> P4Result<String> {
    let output = runner
        .run(Invocation::new(ctx.folder(), ["print", filename]))
        .await?
        .into_stdout()?;
    Ok(normalize_print_output(&output, separator))
}

/// Command line for the configured viewer with every placeholder filled in.
pub fn diff_command_line(template: &str, depot_copy: &Path, local_file: &Path) -> String {
    let depot_path = depot_copy.to_string_lossy();
    let depot_name = depot_copy
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let local_path = local_file.to_string_lossy();
    let local_name = local_file
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    expand_template(
        template,
        &[
            (DEPOT_FILE_PATH_PLACEHOLDER, depot_path.as_ref()),
            (DEPOT_FILE_NAME_PLACEHOLDER, depot_name.as_ref()),
            (LOCAL_FILE_PATH_PLACEHOLDER, local_path.as_ref()),
            (LOCAL_FILE_NAME_PLACEHOLDER, local_name.as_ref()),
        ],
    )
}

/// Writes the depot revision of `file` to a temporary file, opens the viewer
/// on it and the local copy, and removes the temporary file once the viewer
/// exits (or anything before that fails).
pub async fn graphical_diff<R: CommandRunner>(
    runner: &R,
    file: &Path,
    template: &str,
    separator: &str,
) -> P4Result<String> {
    let (folder, name) = split_file_path(file)?;
    let ctx = WorkspaceContext::from_folder(&folder);
    let content = fetch_and_normalize(runner, &ctx, &name, separator).await?;

    let mut depot_copy = tempfile::Builder::new()
        .prefix(DEPOT_TEMP_PREFIX)
        .suffix(&format!("-{name}"))
        .tempfile()
        .map_err(|err| P4Error::io("failed to create depot copy", err))?;
    write_depot_copy(&mut depot_copy, &content)?;

    let line = diff_command_line(template, depot_copy.path(), &folder.join(&name));
    info!(command = %line, "launching graphical diff");
    let output = run_shell_line(&line, &folder).await?;
    drop(depot_copy);
    // GUI viewers chatter on stderr; only the exit status counts here.
    if output.exit_failed() {
        let stderr = output.stderr.trim();
        let message = if stderr.is_empty() {
            format!("diff viewer exited with a failure status: {line}")
        } else {
            stderr.to_string()
        };
        return Err(P4Error::Backend(message));
    }
    Ok(format!("compared {name} against its depot revision"))
}

fn write_depot_copy(file: &mut NamedTempFile, content: &str) -> P4Result<()> {
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| P4Error::io("failed to write depot copy", err))
}
