use crate::constants::{DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_P4_BIN};
use crate::error::{P4Error, P4Result};
use crate::shell::{preferred_shell, shell_join, with_setup_prefix};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// One p4 call: arguments after the binary name, the directory it runs in,
/// and optional text fed on stdin (`change -i`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new<I, S>(cwd: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn command_line(&self) -> String {
        shell_join(&self.args)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn exit_failed(&self) -> bool {
        !self.success
    }

    /// Stdout of a clean run; anything on the error stream is a backend error,
    /// passed through unmodified apart from surrounding whitespace.
    pub fn into_stdout(self) -> P4Result<String> {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return Err(P4Error::Backend(stderr.to_string()));
        }
        if !self.success {
            let stdout = self.stdout.trim();
            let message = if stdout.is_empty() {
                "p4 exited with a failure status".to_string()
            } else {
                stdout.to_string()
            };
            return Err(P4Error::Backend(message));
        }
        Ok(self.stdout)
    }
}

/// Executes p4 invocations. Process exit is the only suspension point.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: Invocation) -> impl Future<Output = P4Result<CmdOutput>> + Send;
}

#[derive(Debug, Clone)]
pub struct P4Runner {
    program: String,
    timeout: Duration,
    shell_setup: Option<String>,
}

impl Default for P4Runner {
    fn default() -> Self {
        Self::new(DEFAULT_P4_BIN)
    }
}

impl P4Runner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            shell_setup: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shell_setup(mut self, setup: Option<String>) -> Self {
        self.shell_setup = setup.filter(|setup| !setup.trim().is_empty());
        self
    }

    /// Full `sh -c` line when a login-shell setup has to run first.
    pub fn shell_line(&self, invocation: &Invocation) -> Option<String> {
        let setup = self.shell_setup.as_deref()?;
        let mut words = Vec::with_capacity(invocation.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(invocation.args.iter().map(String::as_str));
        Some(with_setup_prefix(setup, &shell_join(&words)))
    }

    fn build_command(&self, invocation: &Invocation) -> Command {
        let mut command = match self.shell_line(invocation) {
            Some(line) => {
                let mut command = Command::new(preferred_shell());
                command.arg("-c").arg(line);
                command
            }
            None => {
                let mut command = Command::new(&self.program);
                command.args(&invocation.args);
                command
            }
        };
        command
            .current_dir(&invocation.cwd)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl CommandRunner for P4Runner {
    fn run(&self, invocation: Invocation) -> impl Future<Output = P4Result<CmdOutput>> + Send {
        async move {
            let label = format!("{} {}", self.program, invocation.command_line());
            debug!(command = %label, cwd = %invocation.cwd.display(), "running p4");

            let mut child = self
                .build_command(&invocation)
                .spawn()
                .map_err(|source| P4Error::Spawn {
                    program: self.program.clone(),
                    source,
                })?;

            let input = invocation.stdin;
            let write_label = label.clone();
            let run = async move {
                if let Some(input) = input
                    && let Some(mut stdin) = child.stdin.take()
                {
                    stdin.write_all(input.as_bytes()).await.map_err(|err| {
                        P4Error::io(format!("failed to write stdin to `{write_label}`"), err)
                    })?;
                }
                child
                    .wait_with_output()
                    .await
                    .map_err(|err| P4Error::io(format!("failed to wait for `{write_label}`"), err))
            };

            let output = match tokio::time::timeout(self.timeout, run).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!(command = %label, timeout_secs = self.timeout.as_secs(), "p4 timed out");
                    return Err(P4Error::Timeout {
                        command: label,
                        timeout: self.timeout,
                    });
                }
            };

            Ok(CmdOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

/// Runs an arbitrary shell line (graphical diff viewers) without a timeout;
/// the viewer lives until the user closes it.
pub async fn run_shell_line(line: &str, cwd: &Path) -> P4Result<CmdOutput> {
    let shell = preferred_shell();
    debug!(command = %line, cwd = %cwd.display(), "running shell line");
    let output = Command::new(&shell)
        .arg("-c")
        .arg(line)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| P4Error::Spawn {
            program: shell,
            source,
        })?;
    Ok(CmdOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}
