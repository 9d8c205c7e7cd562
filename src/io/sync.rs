use std::path::PathBuf;
use std::process::{Command, Output};

/// Error type for version-control operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not run git {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Something that can snapshot files after a change.
///
/// The CLI layer holds one of these; the task operations never call it, so
/// they run the same with or without git installed.
pub trait VersionControl {
    /// Commit `files` with `message`. Returns `false` when there was nothing
    /// to commit.
    fn commit(&self, files: &[PathBuf], message: &str) -> Result<bool, SyncError>;
}

/// The `git` command-line tool, run against one repository directory.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Git { dir: dir.into() }
    }

    /// `git init`
    pub fn init(&self) -> Result<String, SyncError> {
        self.run(&["init"])
    }

    pub fn pull(&self) -> Result<String, SyncError> {
        self.run(&["pull"])
    }

    pub fn push(&self) -> Result<String, SyncError> {
        self.run(&["push"])
    }

    pub fn status(&self) -> Result<String, SyncError> {
        self.run(&["status"])
    }

    /// The last `count` commits.
    pub fn log(&self, count: usize) -> Result<String, SyncError> {
        let n = format!("-{}", count);
        self.run(&["log", &n])
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.dir);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String, SyncError> {
        let name = args.first().copied().unwrap_or_default().to_string();
        tracing::debug!(dir = %self.dir.display(), ?args, "running git");
        let output = self
            .command()
            .args(args)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: name.clone(),
                source: e,
            })?;
        check(&name, output)
    }
}

fn check(command: &str, output: Output) -> Result<String, SyncError> {
    if output.status.success() {
        // git push/pull report progress on stderr
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            text = String::from_utf8_lossy(&output.stderr).into_owned();
        }
        Ok(text.trim_end().to_string())
    } else {
        Err(SyncError::Failed {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl VersionControl for Git {
    fn commit(&self, files: &[PathBuf], message: &str) -> Result<bool, SyncError> {
        let existing: Vec<&PathBuf> = files.iter().filter(|p| p.exists()).collect();
        if existing.is_empty() {
            return Ok(false);
        }

        let add = self
            .command()
            .arg("add")
            .arg("--")
            .args(&existing)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: "add".to_string(),
                source: e,
            })?;
        check("add", add)?;

        // exit code 1 means staged changes exist
        let diff = self
            .command()
            .args(["diff", "--cached", "--quiet", "--"])
            .args(&existing)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: "diff".to_string(),
                source: e,
            })?;
        if diff.status.success() {
            return Ok(false);
        }

        let commit = self
            .command()
            .args(["commit", "-m", message, "--"])
            .args(&existing)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: "commit".to_string(),
                source: e,
            })?;
        check("commit", commit)?;
        tracing::debug!(files = existing.len(), "committed");
        Ok(true)
    }
}
