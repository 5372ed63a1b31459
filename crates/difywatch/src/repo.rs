// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Repository snapshot provider
//!
//! Keeps a local checkout of a remote repository fresh using the `git`
//! binary: clone when absent, back up and re-clone when the path exists but
//! is not a repository, pull otherwise. Every invocation is a blocking
//! subprocess with an explicit timeout; on expiry the child is killed.
//! `recent_log` produces the raw `--name-status` text the change
//! classifier consumes.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

/// Timeout for lightweight repository-identity checks.
pub const IDENT_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for clone/fetch operations.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(300);
/// Timeout for reading the recent commit log.
pub const LOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Shallow-clone depth; generous enough to cover a day of commits.
const CLONE_DEPTH: &str = "200";

/// Errors from git subprocess operations
#[derive(Debug, Error)]
pub enum RepoError {
    /// Could not spawn or talk to the git binary
    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// The command did not finish within its timeout
    #[error("git {command} timed out after {secs}s")]
    Timeout {
        /// The git subcommand that was running
        command: String,
        /// The timeout that expired
        secs: u64,
    },

    /// The command exited non-zero
    #[error("git {command} failed: {stderr}")]
    Failed {
        /// The git subcommand that failed
        command: String,
        /// Captured stderr, trimmed
        stderr: String,
    },
}

/// Drain a child pipe on a thread so a full pipe buffer cannot stall the
/// timeout loop in `run_git`.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut text);
        }
        text
    })
}

/// Kill a timed-out child, reaping it so no zombie is left behind.
fn kill(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run a git command under `cwd` with a timeout, returning stdout.
fn run_git(args: &[&str], cwd: Option<&Path>, timeout: Duration) -> Result<String, RepoError> {
    let command = args.first().copied().unwrap_or("").to_string();

    let mut cmd = Command::new("git");
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let mut child = cmd.spawn()?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() > timeout {
            kill(child);
            return Err(RepoError::Timeout {
                command,
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(Duration::from_millis(50));
    };

    let out = stdout.join().unwrap_or_default();
    let err = stderr.join().unwrap_or_default();

    if status.success() {
        Ok(out)
    } else {
        Err(RepoError::Failed {
            command,
            stderr: err.trim().to_string(),
        })
    }
}

/// True when `path` is inside a git working tree.
fn is_work_tree(path: &Path) -> bool {
    run_git(
        &["rev-parse", "--is-inside-work-tree"],
        Some(path),
        IDENT_TIMEOUT,
    )
    .map(|out| out.trim() == "true")
    .unwrap_or(false)
}

fn clone_into(path: &Path, remote: &str, timeout: Duration) -> Result<(), RepoError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let target = path.to_string_lossy();
    run_git(
        &["clone", "--depth", CLONE_DEPTH, remote, &target],
        None,
        timeout,
    )?;
    Ok(())
}

/// Name for backing up a path that exists but is not a repository.
fn backup_path(path: &Path, stamp: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!("_bak_{stamp}"));
    PathBuf::from(name)
}

/// Create or refresh the snapshot at `path` from `remote`.
///
/// Returns whether a usable snapshot is in place. All failure detail is
/// logged here; the caller only decides whether to count that category as
/// zero for the run. `sync_timeout` lets the orchestrator clip the long
/// operations to the remaining run budget.
pub fn ensure(path: &Path, remote: &str, sync_timeout: Duration) -> bool {
    if !path.exists() {
        info!(path = %path.display(), remote, "cloning repository");
        return match clone_into(path, remote, sync_timeout) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "clone failed");
                false
            }
        };
    }

    if !is_work_tree(path) {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
        let backup = backup_path(path, &stamp);
        warn!(path = %path.display(), backup = %backup.display(),
            "path is not a git repository, backing up and re-cloning");
        if let Err(e) = std::fs::rename(path, &backup) {
            warn!(path = %path.display(), error = %e, "backup rename failed");
            return false;
        }
        return match clone_into(path, remote, sync_timeout) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "re-clone failed, restoring backup");
                if let Err(e) = std::fs::rename(&backup, path) {
                    warn!(backup = %backup.display(), error = %e, "backup restore failed");
                }
                false
            }
        };
    }

    info!(path = %path.display(), "updating existing repository");
    match run_git(&["pull", "--ff-only"], Some(path), sync_timeout) {
        Ok(_) => true,
        Err(e) => {
            // A stale snapshot is still countable; yesterday's numbers beat none.
            warn!(path = %path.display(), error = %e, "pull failed, using existing snapshot");
            true
        }
    }
}

/// Raw log text for the trailing `lookback_hours`, in the shape the change
/// classifier expects: `commit <id>` headers, epoch-second timestamp lines,
/// and `status<TAB>path` file lines.
///
/// # Errors
///
/// Returns an error when git fails or exceeds [`LOG_TIMEOUT`].
pub fn recent_log(path: &Path, lookback_hours: u64) -> Result<String, RepoError> {
    let since = format!("--since={lookback_hours}.hours");
    run_git(
        &[
            "log",
            &since,
            "--pretty=format:commit %H%n%at",
            "--name-status",
        ],
        Some(path),
        LOG_TIMEOUT,
    )
}
