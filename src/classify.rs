use crate::context::{WorkspaceContext, split_file_path};
use crate::error::P4Result;
use crate::process::CommandRunner;
use crate::session::{get_client_root, normalize_separators};
use serde::Serialize;
use std::fmt;
use std::path::{MAIN_SEPARATOR, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClassification {
    Tracked,
    Untracked,
    PendingAdd,
}

impl fmt::Display for FileClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracked => write!(f, "tracked"),
            Self::Untracked => write!(f, "untracked"),
            Self::PendingAdd => write!(f, "pending-add"),
        }
    }
}

fn path_segments(path: &Path) -> Vec<String> {
    let normalized = normalize_separators(&path.to_string_lossy()).to_lowercase();
    let mut segments: Vec<String> = Vec::new();
    for segment in normalized.split(MAIN_SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment.to_string()),
        }
    }
    segments
}

/// Case-insensitive, whole-segment prefix test: `/data/proj` contains
/// `/data/proj/src` but not `/data/proj2`.
pub fn is_under_root(client_root: &Path, folder: &Path) -> bool {
    let root = path_segments(client_root);
    let folder = path_segments(folder);
    folder.len() >= root.len() && folder.iter().zip(&root).all(|(a, b)| a == b)
}

/// Containment and disk existence only; the client view is never consulted, so
/// a file under the root but outside the view still comes back `Tracked`.
pub fn classify(client_root: &Path, folder: &Path, filename: &str) -> FileClassification {
    let under_root = is_under_root(client_root, folder);
    let exists = folder.join(filename).exists();
    match (exists, under_root) {
        (true, true) => FileClassification::Tracked,
        (false, true) => FileClassification::PendingAdd,
        (_, false) => FileClassification::Untracked,
    }
}

/// Classifies `file` against the client root reported for `ctx`.
pub async fn classify_file<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    file: &Path,
) -> P4Result<FileClassification> {
    let (folder, name) = split_file_path(file)?;
    let root = get_client_root(runner, ctx).await?;
    Ok(classify(&root, &folder, &name))
}
