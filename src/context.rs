use crate::error::{P4Error, P4Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Directory whose p4 configuration (P4CONFIG, P4CLIENT, ...) applies to an action.
///
/// Captured once when a user action starts and handed to every backend call
/// of that action, so a listing started in one workspace finishes there even
/// if the host switches to a file from another workspace in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    folder: PathBuf,
}

impl WorkspaceContext {
    pub fn from_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Context for the folder containing `file`.
    pub fn from_file(file: &Path) -> P4Result<Self> {
        let (folder, _) = split_file_path(file)?;
        Ok(Self { folder })
    }

    pub fn current_dir() -> P4Result<Self> {
        let folder = env::current_dir()
            .map_err(|err| P4Error::io("failed to read current directory", err))?;
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

/// Drops `.` and folds `..` into its parent without touching the filesystem.
/// `..` above the root stays at the root.
fn collapse_dots(path: &Path) -> PathBuf {
    let mut collapsed = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if collapsed.file_name().is_some() {
                    collapsed.pop();
                } else if !collapsed.has_root() {
                    collapsed.push(component);
                }
            }
            other => collapsed.push(other),
        }
    }
    collapsed
}

/// Splits a file path into its (absolute, dot-free) folder and bare file name.
pub fn split_file_path(file: &Path) -> P4Result<(PathBuf, String)> {
    let absolute = if file.is_absolute() {
        collapse_dots(file)
    } else {
        collapse_dots(
            &env::current_dir()
                .map_err(|err| P4Error::io("failed to read current directory", err))?
                .join(file),
        )
    };
    let name = absolute
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| P4Error::not_eligible(format!("{} is not a file path", file.display())))?
        .to_string();
    let folder = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    Ok((folder, name))
}
