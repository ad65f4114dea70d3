use crate::cli::{Commands, HookKind};
use anyhow::{Context, Result};
use p4act::actions;
use p4act::changelist::{
    Changelist, append_description_line, create, list_opened, list_pending, move_file, shelve,
    submit, unshelve,
};
use p4act::classify::classify_file;
use p4act::context::split_file_path;
use p4act::depot::{fetch_and_normalize, graphical_diff};
use p4act::hooks::{HookEvent, handle_event};
use p4act::session::{get_user, inspect};
use p4act::tasks::spawn_action;
use p4act::{Config, Outcome, P4Error, P4Result, P4Runner, Reporter, WorkspaceContext};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Runs one subcommand to completion. Returns whether it failed.
pub(crate) async fn run(command: Commands, ctx: WorkspaceContext, config: Config) -> Result<bool> {
    let command = resolve_password(command).await?;
    let name = command.name();
    let prints_payload = command.prints_payload();
    let hook_json = matches!(command, Commands::Hook { json: true, .. });
    let reporter = Reporter::from_config(&config);
    let runner = config.runner();

    let failed = Arc::new(AtomicBool::new(false));
    let failed_flag = Arc::clone(&failed);
    let handle = spawn_action(
        name,
        execute(command, ctx, config, runner),
        None,
        move |outcome| {
            failed_flag.store(outcome.is_failure(), Ordering::SeqCst);
            if hook_json {
                match serde_json::to_string(&outcome) {
                    Ok(line) => println!("{line}"),
                    Err(err) => eprintln!("error: failed to serialize outcome: {err}"),
                }
            }
            match &outcome {
                Outcome::Success(payload) if prints_payload => println!("{}", payload.trim_end()),
                _ => reporter.report(name, &outcome),
            }
        },
    );
    handle.await.context("action task did not complete")?;
    Ok(failed.load(Ordering::SeqCst))
}

async fn resolve_password(command: Commands) -> Result<Commands> {
    let Commands::Login { password: None } = command else {
        return Ok(command);
    };
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;
    Ok(Commands::Login {
        password: Some(line.trim_end_matches(['\r', '\n']).to_string()),
    })
}

fn to_json<T: Serialize>(value: &T) -> P4Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| P4Error::io("failed to serialize output", err.into()))
}

fn hook_event(kind: HookKind, dirty: bool, created: bool) -> HookEvent {
    match kind {
        HookKind::Modified => HookEvent::Modified,
        HookKind::PreSave => HookEvent::PreSave { dirty },
        HookKind::PostSave => HookEvent::PostSave { created },
    }
}

pub(crate) fn format_changes(changes: &[Changelist]) -> String {
    let mut lines = Vec::new();
    for change in changes {
        if change.description.is_empty() {
            lines.push(change.id.to_string());
        } else {
            lines.push(format!("{}  {}", change.id, change.description));
        }
        for file in &change.files {
            lines.push(format!("    {}", file.raw));
        }
    }
    lines.join("\n")
}

async fn execute(
    command: Commands,
    ctx: WorkspaceContext,
    config: Config,
    runner: P4Runner,
) -> P4Result<String> {
    match command {
        Commands::Info { json } => {
            let session = inspect(&runner, &ctx).await?;
            if json {
                to_json(&session)
            } else {
                Ok(format!(
                    "user: {}\nclient root: {}",
                    session.user,
                    session.client_root.display()
                ))
            }
        }
        Commands::Classify { file, json } => {
            let file_ctx = WorkspaceContext::from_file(&file)?;
            let classification = classify_file(&runner, &file_ctx, &file).await?;
            if json {
                to_json(&serde_json::json!({
                    "file": file,
                    "classification": classification,
                }))
            } else {
                Ok(classification.to_string())
            }
        }
        Commands::Checkout { file } => actions::checkout(&runner, &file).await,
        Commands::Add { file } => actions::add(&runner, &file).await,
        Commands::Delete { file } => actions::delete(&runner, &file).await,
        Commands::Revert { file } => actions::revert(&runner, &file).await,
        Commands::Diff { file } => actions::diff(&runner, &file).await,
        Commands::Print { file } => {
            let (folder, name) = split_file_path(&file)?;
            let file_ctx = WorkspaceContext::from_folder(folder);
            fetch_and_normalize(&runner, &file_ctx, &name, &config.end_line_separator).await
        }
        Commands::GraphicalDiff { file } => {
            graphical_diff(
                &runner,
                &file,
                config.graphical_diff_command(),
                &config.end_line_separator,
            )
            .await
        }
        Commands::Rename { old, new } => actions::rename(&runner, &old, &new).await,
        Commands::Changes { files, json } => {
            let user = get_user(&runner, &ctx).await?;
            let mut changes = list_pending(&runner, &ctx, &user).await?;
            if files {
                for change in &mut changes {
                    change.files = list_opened(&runner, &ctx, change.id).await?;
                }
            }
            if json {
                to_json(&changes)
            } else {
                Ok(format_changes(&changes))
            }
        }
        Commands::Opened { changelist, json } => {
            let files = list_opened(&runner, &ctx, changelist).await?;
            if json {
                to_json(&files)
            } else {
                Ok(files
                    .iter()
                    .map(|file| file.raw.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
        Commands::NewChange { description } => {
            let change = create(&runner, &ctx, &description).await?;
            Ok(format!("Change {} created.", change.id))
        }
        Commands::DescribeAppend { changelist, text } => {
            append_description_line(&runner, &ctx, changelist, &text).await
        }
        Commands::Move { file, changelist } => move_file(&runner, &file, changelist).await,
        Commands::Shelve { changelist } => shelve(&runner, &ctx, changelist).await,
        Commands::Unshelve {
            changelist,
            no_force,
        } => unshelve(&runner, &ctx, changelist, !no_force).await,
        Commands::Submit { changelist } => submit(&runner, &ctx, changelist).await,
        Commands::Login { password } => {
            actions::login(&runner, &ctx, password.as_deref().unwrap_or_default()).await
        }
        Commands::Logout => actions::logout(&runner, &ctx).await,
        Commands::Hook {
            event,
            file,
            dirty,
            created,
            ..
        } => handle_event(&runner, &config, hook_event(event, dirty, created), &file).await,
        Commands::Config => toml::to_string_pretty(&config).map_err(|err| {
            P4Error::io("failed to render configuration", std::io::Error::other(err))
        }),
    }
}
