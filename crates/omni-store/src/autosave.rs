//! Two-stage debounced autosave pipeline.
//!
//! Stage 1 absorbs keystroke bursts: every edit ping resets a short settle
//! timer. Stage 2 waits for a longer quiet period, reset only by settled
//! bursts, before asking the target to save. A manual save cancels both
//! timers so it never doubles up with a scheduled one.
//!
//! The pipeline is a spawned task driven by a control channel; saves run
//! inside the loop, so they never overlap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use omni_core::{defaults, Error, Result};

/// Something the pipeline can save: an edit session, in practice.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Whether an automatic save should run right now (valid and dirty).
    fn is_ready(&self) -> bool;

    /// Persist the current state; success must clear the dirty flag.
    async fn save(&self) -> Result<()>;
}

/// Debounce windows. Defaults match the editor's feel: 300ms to settle a
/// burst of typing, 5s of quiet before committing.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveConfig {
    pub settle: Duration,
    pub quiet: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(defaults::AUTOSAVE_SETTLE_MS),
            quiet: Duration::from_millis(defaults::AUTOSAVE_QUIET_MS),
        }
    }
}

/// Lifecycle notifications for observers (status indicators, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    /// A burst settled; the quiet timer is (re)armed.
    Scheduled,
    Saved,
    SaveFailed,
}

enum Control {
    Edited,
    SaveNow(oneshot::Sender<Result<()>>),
    Shutdown,
}

/// Handle to a running autosave task.
pub struct AutosavePipeline {
    tx: mpsc::Sender<Control>,
    events: broadcast::Sender<AutosaveEvent>,
    handle: JoinHandle<()>,
}

impl AutosavePipeline {
    /// Spawn the pipeline task over `target`.
    pub fn spawn(target: Arc<dyn SaveTarget>, config: AutosaveConfig) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let (events, _) = broadcast::channel(defaults::STORE_EVENT_CAPACITY);
        let handle = tokio::spawn(run(target, config, rx, events.clone()));
        Self { tx, events, handle }
    }

    /// Report one edit. Cheap; call it on every change.
    pub async fn edited(&self) {
        let _ = self.tx.send(Control::Edited).await;
    }

    /// Save immediately, cancelling any pending timers.
    ///
    /// The result is the save's own result, surfaced to the caller because
    /// manual-save failures are user-visible.
    pub async fn save_now(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Control::SaveNow(reply_tx))
            .await
            .map_err(|_| Error::Internal("autosave task is gone".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::Internal("autosave task dropped the reply".to_string()))?
    }

    /// Subscribe to autosave lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<AutosaveEvent> {
        self.events.subscribe()
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Control::Shutdown).await;
        let _ = self.handle.await;
    }
}

async fn run(
    target: Arc<dyn SaveTarget>,
    config: AutosaveConfig,
    mut rx: mpsc::Receiver<Control>,
    events: broadcast::Sender<AutosaveEvent>,
) {
    let mut settle_deadline: Option<Instant> = None;
    let mut quiet_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(Control::Edited) => {
                    settle_deadline = Some(Instant::now() + config.settle);
                }
                Some(Control::SaveNow(reply)) => {
                    settle_deadline = None;
                    quiet_deadline = None;
                    let result = target.save().await;
                    let _ = events.send(match &result {
                        Ok(()) => AutosaveEvent::Saved,
                        Err(_) => AutosaveEvent::SaveFailed,
                    });
                    let _ = reply.send(result);
                }
                Some(Control::Shutdown) | None => break,
            },
            // Disabled branches still evaluate their expression, hence the
            // dummy instant when no deadline is armed.
            _ = sleep_until(settle_deadline.unwrap_or_else(Instant::now)),
                if settle_deadline.is_some() =>
            {
                settle_deadline = None;
                quiet_deadline = Some(Instant::now() + config.quiet);
                debug!("edit burst settled, quiet timer armed");
                let _ = events.send(AutosaveEvent::Scheduled);
            }
            _ = sleep_until(quiet_deadline.unwrap_or_else(Instant::now)),
                if quiet_deadline.is_some() =>
            {
                quiet_deadline = None;
                if target.is_ready() {
                    match target.save().await {
                        Ok(()) => {
                            debug!("autosaved");
                            let _ = events.send(AutosaveEvent::Saved);
                        }
                        Err(e) => {
                            // The dirty flag survives a failed save; the next
                            // settled burst schedules a retry.
                            warn!(error = %e, "autosave failed");
                            let _ = events.send(AutosaveEvent::SaveFailed);
                        }
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for AutosavePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosavePipeline").finish()
    }
}
