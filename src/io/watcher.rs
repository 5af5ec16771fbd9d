use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the sync loop.
#[derive(Debug, PartialEq, Eq)]
pub enum FileEvent {
    /// The watched file was created or modified.
    Changed,
    /// The watched file was removed.
    Removed,
}

/// Polls a single file for changes.
///
/// The parent directory is watched rather than the file itself so that a
/// file which does not exist yet is picked up once it is created.
pub struct DataFileWatcher {
    _watcher: PollWatcher,
    rx: mpsc::Receiver<FileEvent>,
    path: PathBuf,
}

// Only the parent is watched (non-recursively), so the file name alone
// identifies the target. Event paths are joined onto the watched directory
// and may carry a `./` prefix the caller's path lacks.
fn names_file(event_path: &Path, file_name: &OsStr) -> bool {
    event_path.file_name() == Some(file_name)
}

impl DataFileWatcher {
    /// Start polling `path` every `interval`. The parent directory is created
    /// if missing.
    pub fn start(path: &Path, interval: Duration) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = path.to_path_buf();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| notify::Error::generic("watched path has no file name"))?
            .to_owned();
        std::fs::create_dir_all(&parent).map_err(notify::Error::io)?;

        let mut watcher = PollWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };
                if !event.paths.iter().any(|p| names_file(p, &file_name)) {
                    return;
                }
                let mapped = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => FileEvent::Changed,
                    EventKind::Remove(_) => FileEvent::Removed,
                    _ => return,
                };
                let _ = tx.send(mapped);
            },
            Config::default()
                .with_poll_interval(interval)
                .with_compare_contents(true),
        )?;

        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        Ok(DataFileWatcher {
            _watcher: watcher,
            rx,
            path: target,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next event, or return None after `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<FileEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking poll for pending file events.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
