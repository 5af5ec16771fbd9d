use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// A recurring job on its own thread.
///
/// The job runs once right away, then again `period` after each run finishes,
/// so runs never overlap. Dropping the handle (or calling [`Periodic::stop`])
/// cancels the timer and joins the thread.
pub struct Periodic {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

/// Returned by a job to keep the timer going or end it early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

impl Periodic {
    pub fn start<F>(name: &str, period: Duration, mut job: F) -> std::io::Result<Self>
    where
        F: FnMut() -> Tick + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    if job() == Tick::Stop {
                        break;
                    }
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        // Stop requested or handle dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("periodic timer finished");
            })?;
        Ok(Periodic {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Cancel the timer and wait for an in-flight run to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Block until the job ends on its own (returns [`Tick::Stop`])
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Periodic {
    fn drop(&mut self) {
        self.shutdown();
    }
}
