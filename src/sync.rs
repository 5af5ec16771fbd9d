//! Commit-and-push helpers that publish the board snapshot through git.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::io::timer::Tick;
use crate::io::watcher::{DataFileWatcher, FileEvent};

/// Error type for git sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("could not watch {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}

/// What a sync attempt ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Pushed,
    NothingToCommit,
}

/// Result of `git commit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Committed,
    NothingToCommit,
}

/// The git operations sync needs, so they can be faked in tests
pub trait Git {
    fn add_all(&self) -> Result<(), SyncError>;
    fn status_porcelain(&self) -> Result<String, SyncError>;
    fn commit(&self, message: &str) -> Result<CommitResult, SyncError>;
    fn push(&self) -> Result<(), SyncError>;
}

/// Shells out to the `git` binary in a working tree
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
}

impl SystemGit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SystemGit { root: root.into() }
    }

    fn run(&self, args: &[&str]) -> Result<Output, SyncError> {
        tracing::debug!(?args, root = %self.root.display(), "git");
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?)
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output, SyncError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(SyncError::Failed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Git for SystemGit {
    fn add_all(&self) -> Result<(), SyncError> {
        self.run_checked(&["add", "."])?;
        Ok(())
    }

    fn status_porcelain(&self) -> Result<String, SyncError> {
        let output = self.run_checked(&["status", "--porcelain"])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn commit(&self, message: &str) -> Result<CommitResult, SyncError> {
        let output = self.run(&["commit", "-m", message])?;
        if output.status.success() {
            return Ok(CommitResult::Committed);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_nothing_to_commit(&stdout) || is_nothing_to_commit(&stderr) {
            return Ok(CommitResult::NothingToCommit);
        }
        Err(SyncError::Failed {
            command: "commit".to_string(),
            stderr: stderr.trim().to_string(),
        })
    }

    fn push(&self) -> Result<(), SyncError> {
        self.run_checked(&["push"])?;
        Ok(())
    }
}

fn is_nothing_to_commit(text: &str) -> bool {
    text.contains("nothing to commit") || text.contains("nothing added to commit")
}

/// Stage everything, commit with `message`, and push.
pub fn sync_once(git: &impl Git, message: &str) -> Result<SyncOutcome, SyncError> {
    git.add_all()?;
    match git.commit(message)? {
        CommitResult::NothingToCommit => {
            tracing::info!("no changes to commit");
            Ok(SyncOutcome::NothingToCommit)
        }
        CommitResult::Committed => {
            git.push()?;
            tracing::info!(commit = message, "synced");
            Ok(SyncOutcome::Pushed)
        }
    }
}

/// Commit message used by the watcher, e.g. `Update board - 2026-02-10 09:30:00`
pub fn watch_commit_message(now: DateTime<Local>) -> String {
    format!("Update board - {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// React to one change of the watched file: stage, skip if the tree is
/// clean, otherwise commit and push.
pub fn sync_change(git: &impl Git, now: DateTime<Local>) -> Result<SyncOutcome, SyncError> {
    git.add_all()?;
    if git.status_porcelain()?.trim().is_empty() {
        tracing::info!("no actual changes detected");
        return Ok(SyncOutcome::NothingToCommit);
    }
    let message = watch_commit_message(now);
    if git.commit(&message)? == CommitResult::NothingToCommit {
        return Ok(SyncOutcome::NothingToCommit);
    }
    git.push()?;
    tracing::info!(commit = %message, "synced");
    Ok(SyncOutcome::Pushed)
}

/// Poll `data_file` and sync every change.
///
/// `report` is called with each outcome so the caller can print progress; the
/// loop ends when it returns [`Tick::Stop`]. Git failures are logged and the
/// loop keeps going.
pub fn watch_and_sync<G, F>(git: &G, data_file: &Path, interval: Duration, mut report: F) -> Result<(), SyncError>
where
    G: Git,
    F: FnMut(WatchEvent) -> Tick,
{
    let watcher = DataFileWatcher::start(data_file, interval).map_err(|e| SyncError::Watch {
        path: data_file.to_path_buf(),
        source: e,
    })?;
    let mut waiting = false;
    loop {
        if !watcher.path().exists() {
            if !waiting {
                waiting = true;
                if report(WatchEvent::Waiting) == Tick::Stop {
                    return Ok(());
                }
            }
        } else {
            waiting = false;
        }
        match watcher.wait(interval) {
            Some(FileEvent::Changed) => {
                if report(WatchEvent::ChangeDetected) == Tick::Stop {
                    return Ok(());
                }
                let next = match sync_change(git, Local::now()) {
                    Ok(outcome) => report(WatchEvent::Synced(outcome)),
                    Err(e) => {
                        tracing::warn!(error = %e, "sync failed");
                        report(WatchEvent::Failed(e.to_string()))
                    }
                };
                if next == Tick::Stop {
                    return Ok(());
                }
            }
            Some(FileEvent::Removed) => tracing::debug!("data file removed"),
            None => {}
        }
    }
}

/// Progress notifications from [`watch_and_sync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Waiting,
    ChangeDetected,
    Synced(SyncOutcome),
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    /// Records calls and replays canned results
    #[derive(Default)]
    struct FakeGit {
        calls: RefCell<Vec<String>>,
        status: String,
        nothing_to_commit: bool,
        push_fails: bool,
    }

    impl Git for FakeGit {
        fn add_all(&self) -> Result<(), SyncError> {
            self.calls.borrow_mut().push("add .".into());
            Ok(())
        }

        fn status_porcelain(&self) -> Result<String, SyncError> {
            self.calls.borrow_mut().push("status".into());
            Ok(self.status.clone())
        }

        fn commit(&self, message: &str) -> Result<CommitResult, SyncError> {
            self.calls.borrow_mut().push(format!("commit {}", message));
            if self.nothing_to_commit {
                Ok(CommitResult::NothingToCommit)
            } else {
                Ok(CommitResult::Committed)
            }
        }

        fn push(&self) -> Result<(), SyncError> {
            self.calls.borrow_mut().push("push".into());
            if self.push_fails {
                return Err(SyncError::Failed {
                    command: "push".into(),
                    stderr: "rejected".into(),
                });
            }
            Ok(())
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).earliest().unwrap()
    }

    #[test]
    fn sync_once_adds_commits_pushes() {
        let git = FakeGit::default();
        assert_eq!(sync_once(&git, "Update Kanban board").unwrap(), SyncOutcome::Pushed);
        assert_eq!(
            *git.calls.borrow(),
            vec!["add .", "commit Update Kanban board", "push"]
        );
    }

    #[test]
    fn sync_once_nothing_to_commit_is_benign() {
        let git = FakeGit {
            nothing_to_commit: true,
            ..Default::default()
        };
        assert_eq!(sync_once(&git, "msg").unwrap(), SyncOutcome::NothingToCommit);
        assert!(!git.calls.borrow().contains(&"push".to_string()));
    }

    #[test]
    fn sync_once_surfaces_push_failure() {
        let git = FakeGit {
            push_fails: true,
            ..Default::default()
        };
        let err = sync_once(&git, "msg").unwrap_err();
        assert_eq!(err.to_string(), "git push failed: rejected");
    }

    #[test]
    fn sync_change_skips_clean_tree() {
        let git = FakeGit::default();
        assert_eq!(sync_change(&git, noon()).unwrap(), SyncOutcome::NothingToCommit);
        assert_eq!(*git.calls.borrow(), vec!["add .", "status"]);
    }

    #[test]
    fn sync_change_commits_with_timestamp() {
        let git = FakeGit {
            status: " M public/board-data.json\n".into(),
            ..Default::default()
        };
        assert_eq!(sync_change(&git, noon()).unwrap(), SyncOutcome::Pushed);
        assert_eq!(
            *git.calls.borrow(),
            vec![
                "add .",
                "status",
                "commit Update board - 2026-02-10 12:00:00",
                "push"
            ]
        );
    }

    #[test]
    fn nothing_to_commit_detection() {
        assert!(is_nothing_to_commit("On branch main\nnothing to commit, working tree clean\n"));
        assert!(is_nothing_to_commit("nothing added to commit but untracked files present"));
        assert!(!is_nothing_to_commit("fatal: not a git repository"));
    }

    /// Run the watch loop on its own thread, forwarding every report, until
    /// `stop_after` says to end it.
    fn spawn_watch(
        git: FakeGit,
        data_file: std::path::PathBuf,
        stop_after: fn(&[WatchEvent]) -> bool,
    ) -> (
        std::sync::mpsc::Receiver<WatchEvent>,
        std::thread::JoinHandle<(FakeGit, Result<(), SyncError>)>,
    ) {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = std::thread::spawn(move || {
            let mut seen = Vec::new();
            let result = watch_and_sync(&git, &data_file, Duration::from_millis(50), |event| {
                seen.push(event.clone());
                let _ = tx.send(event);
                if stop_after(&seen) { Tick::Stop } else { Tick::Continue }
            });
            (git, result)
        });
        (rx, handle)
    }

    fn next_event(rx: &std::sync::mpsc::Receiver<WatchEvent>) -> WatchEvent {
        rx.recv_timeout(Duration::from_secs(10))
            .expect("watch loop went quiet")
    }

    #[test]
    fn watch_waits_for_file_then_syncs_change() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_file = tmp.path().join("public/board-data.json");
        let git = FakeGit {
            status: " M public/board-data.json\n".into(),
            ..Default::default()
        };
        let (rx, handle) = spawn_watch(git, data_file.clone(), |seen| {
            matches!(seen.last(), Some(WatchEvent::Synced(_)))
        });

        assert_eq!(next_event(&rx), WatchEvent::Waiting);
        std::thread::sleep(Duration::from_millis(200));
        std::fs::write(&data_file, r#"{"columns":[],"tasks":[]}"#).unwrap();

        assert_eq!(next_event(&rx), WatchEvent::ChangeDetected);
        assert_eq!(next_event(&rx), WatchEvent::Synced(SyncOutcome::Pushed));

        let (git, result) = handle.join().unwrap();
        assert!(result.is_ok());
        let calls = git.calls.borrow();
        assert_eq!(calls[0], "add .");
        assert_eq!(calls[1], "status");
        assert!(calls[2].starts_with("commit Update board - "));
        assert_eq!(calls[3], "push");
    }

    #[test]
    fn watch_keeps_going_after_failed_push() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_file = tmp.path().join("board-data.json");
        std::fs::write(&data_file, "{}").unwrap();
        let git = FakeGit {
            status: " M board-data.json\n".into(),
            push_fails: true,
            ..Default::default()
        };
        let (rx, handle) = spawn_watch(git, data_file.clone(), |seen| {
            seen.iter().filter(|e| matches!(e, WatchEvent::Failed(_))).count() >= 2
        });

        std::thread::sleep(Duration::from_millis(200));
        std::fs::write(&data_file, r#"{"v":1}"#).unwrap();
        assert_eq!(next_event(&rx), WatchEvent::ChangeDetected);
        assert_eq!(
            next_event(&rx),
            WatchEvent::Failed("git push failed: rejected".into())
        );

        std::thread::sleep(Duration::from_millis(200));
        std::fs::write(&data_file, r#"{"v":2}"#).unwrap();
        let mut failures = 1;
        while failures < 2 {
            if let WatchEvent::Failed(_) = next_event(&rx) {
                failures += 1;
            }
        }

        let (_, result) = handle.join().unwrap();
        assert!(result.is_ok());
    }
}
