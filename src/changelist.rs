use crate::constants::{
    CHANGE_LINE_PREFIX, DEFAULT_CHANGELIST, PENDING_DESCRIPTION_TOKEN, PENDING_ID_TOKEN,
    STATUS_LABEL, SUBMITTED_STATUS,
};
use crate::context::{WorkspaceContext, split_file_path};
use crate::error::{P4Error, P4Result};
use crate::process::{CommandRunner, Invocation};
use crate::spec_block::ChangeSpec;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// `default` always exists and has no editable spec of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ChangelistId {
    Default,
    Numbered(u32),
}

impl fmt::Display for ChangelistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "{DEFAULT_CHANGELIST}"),
            Self::Numbered(id) => write!(f, "{id}"),
        }
    }
}

impl From<ChangelistId> for String {
    fn from(id: ChangelistId) -> Self {
        id.to_string()
    }
}

impl FromStr for ChangelistId {
    type Err = P4Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(DEFAULT_CHANGELIST) {
            return Ok(Self::Default);
        }
        value
            .parse::<u32>()
            .map(Self::Numbered)
            .map_err(|_| P4Error::Parse(format!("`{value}` is not a changelist number")))
    }
}

/// A file opened in a changelist, as reported by `p4 opened`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedFile {
    pub raw: String,
    pub depot_path: String,
    pub revision: Option<u32>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Changelist {
    pub id: ChangelistId,
    pub description: String,
    pub files: Vec<OpenedFile>,
}

/// `Change 1057 on 2013/02/20 by user@client *pending* 'desc...'`
pub fn parse_pending_line(line: &str) -> Option<Changelist> {
    let line = line.trim();
    if !line.starts_with(CHANGE_LINE_PREFIX) {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let id = tokens.get(PENDING_ID_TOKEN)?.parse::<u32>().ok()?;
    let description = tokens
        .get(PENDING_DESCRIPTION_TOKEN..)
        .map(|rest| rest.join(" "))
        .unwrap_or_default();
    Some(Changelist {
        id: ChangelistId::Numbered(id),
        description,
        files: Vec::new(),
    })
}

/// Keeps the backend's order (most recent first); callers display it as-is.
pub fn parse_pending_changes(output: &str) -> Vec<Changelist> {
    output.lines().filter_map(parse_pending_line).collect()
}

/// `//depot/a.c#3 - edit default change (text)`
pub fn parse_opened_line(line: &str) -> Option<OpenedFile> {
    let raw = line.trim();
    let (depot_path, rest) = raw.split_once('#')?;
    if depot_path.is_empty() {
        return None;
    }
    let (revision, details) = rest.split_once(" - ").unwrap_or((rest, ""));
    Some(OpenedFile {
        raw: raw.to_string(),
        depot_path: depot_path.to_string(),
        revision: revision.trim().parse().ok(),
        action: details.split_whitespace().next().map(str::to_string),
    })
}

pub fn parse_opened(output: &str) -> Vec<OpenedFile> {
    output.lines().filter_map(parse_opened_line).collect()
}

/// Id from the `Change 1234 created.` reply of `p4 change -i`.
pub fn parse_created_change(output: &str) -> P4Result<ChangelistId> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(CHANGE_LINE_PREFIX) && line.contains("created"))
        .find_map(|line| line.split_whitespace().nth(PENDING_ID_TOKEN))
        .and_then(|id| id.parse::<u32>().ok())
        .map(ChangelistId::Numbered)
        .ok_or_else(|| {
            P4Error::Parse(format!(
                "`p4 change -i` did not report a created change: {}",
                output.trim()
            ))
        })
}

async fn run_stdout<R: CommandRunner>(runner: &R, invocation: Invocation) -> P4Result<String> {
    runner.run(invocation).await?.into_stdout()
}

fn require_numbered(id: ChangelistId, action: &str) -> P4Result<u32> {
    match id {
        ChangelistId::Numbered(number) => Ok(number),
        ChangelistId::Default => Err(P4Error::not_eligible(format!(
            "the default changelist cannot be {action}; move its files to a numbered changelist first"
        ))),
    }
}

pub async fn list_pending<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    user: &str,
) -> P4Result<Vec<Changelist>> {
    let output = run_stdout(
        runner,
        Invocation::new(ctx.folder(), ["changes", "-s", "pending", "-u", user]),
    )
    .await?;
    Ok(parse_pending_changes(&output))
}

pub async fn list_opened<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: ChangelistId,
) -> P4Result<Vec<OpenedFile>> {
    let output = runner
        .run(Invocation::new(
            ctx.folder(),
            ["opened".to_string(), "-c".to_string(), id.to_string()],
        ))
        .await?;
    // An empty changelist is reported on the error stream.
    if output.stderr.to_ascii_lowercase().contains("not opened") {
        return Ok(Vec::new());
    }
    Ok(parse_opened(&output.into_stdout()?))
}

/// `p4 change -o [id]`; `None` (or `default`) yields the blank template.
pub async fn fetch_spec<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: Option<ChangelistId>,
) -> P4Result<ChangeSpec> {
    let mut args = vec!["change".to_string(), "-o".to_string()];
    if let Some(ChangelistId::Numbered(number)) = id {
        args.push(number.to_string());
    }
    let output = run_stdout(runner, Invocation::new(ctx.folder(), args)).await?;
    Ok(ChangeSpec::parse(&output))
}

/// Writes a spec through `p4 change -i`, feeding it on stdin.
pub async fn submit_spec<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    spec: &ChangeSpec,
) -> P4Result<String> {
    let invocation = Invocation::new(ctx.folder(), ["change", "-i"]).with_stdin(spec.to_text());
    Ok(run_stdout(runner, invocation).await?.trim().to_string())
}

pub async fn create<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    description: &str,
) -> P4Result<Changelist> {
    let mut spec = fetch_spec(runner, ctx, None).await?;
    spec.set_description(description)?;
    // The template lists every file of the default changelist; a new change starts empty.
    let dropped = spec.file_entries().len();
    if spec.strip_files() {
        debug!(dropped, "dropped Files: section from change template");
    }
    let reply = submit_spec(runner, ctx, &spec).await?;
    let id = parse_created_change(&reply)?;
    info!(changelist = %id, "created changelist");
    Ok(Changelist {
        id,
        description: spec.description().unwrap_or_default(),
        files: Vec::new(),
    })
}

pub async fn append_description_line<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: ChangelistId,
    text: &str,
) -> P4Result<String> {
    let number = require_numbered(id, "given a description")?;
    let mut spec = fetch_spec(runner, ctx, Some(ChangelistId::Numbered(number))).await?;
    if spec.field(STATUS_LABEL) == Some(SUBMITTED_STATUS) {
        return Err(P4Error::not_eligible(format!(
            "changelist {number} is already submitted"
        )));
    }
    spec.append_description_line(text)?;
    submit_spec(runner, ctx, &spec).await
}

/// Reopens an already-opened file in another existing changelist.
pub async fn move_file<R: CommandRunner>(
    runner: &R,
    file: &Path,
    id: ChangelistId,
) -> P4Result<String> {
    let (folder, name) = split_file_path(file)?;
    let invocation = Invocation::new(
        &folder,
        ["reopen".to_string(), "-c".to_string(), id.to_string(), name],
    );
    Ok(run_stdout(runner, invocation).await?.trim().to_string())
}

pub async fn shelve<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: ChangelistId,
) -> P4Result<String> {
    let number = require_numbered(id, "shelved")?;
    let invocation = Invocation::new(ctx.folder(), ["shelve".to_string(), format!("-c{number}")]);
    Ok(run_stdout(runner, invocation).await?.trim().to_string())
}

pub async fn unshelve<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: ChangelistId,
    force: bool,
) -> P4Result<String> {
    let number = require_numbered(id, "unshelved")?;
    let mut args = vec!["unshelve".to_string(), format!("-s{number}")];
    if force {
        args.push("-f".to_string());
    }
    Ok(run_stdout(runner, Invocation::new(ctx.folder(), args))
        .await?
        .trim()
        .to_string())
}

pub async fn submit<R: CommandRunner>(
    runner: &R,
    ctx: &WorkspaceContext,
    id: ChangelistId,
) -> P4Result<String> {
    let number = require_numbered(id, "submitted by number")?;
    let invocation = Invocation::new(
        ctx.folder(),
        ["submit".to_string(), "-c".to_string(), number.to_string()],
    );
    let reply = run_stdout(runner, invocation).await?.trim().to_string();
    info!(changelist = number, "submitted changelist");
    Ok(reply)
}
