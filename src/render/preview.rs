//! Preview re-render scheduling.
//!
//! The interactive path re-renders after a fixed quiet period following the
//! last edit, not on every keystroke. The debouncer owns no render state:
//! it forwards the latest submitted text to the callback once the quiet
//! period elapses, dropping every superseded intermediate version.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::constants::preview::DEBOUNCE_MS;

pub struct PreviewDebouncer {
    tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl PreviewDebouncer {
    /// Spawn a debouncer with the standard quiet period.
    pub fn spawn<F>(on_render: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        Self::spawn_with_quiet_period(Duration::from_millis(DEBOUNCE_MS), on_render)
    }

    pub fn spawn_with_quiet_period<F>(quiet: Duration, mut on_render: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let worker = tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(text) => pending = Some(text),
                        None => break,
                    },
                    _ = tokio::time::sleep(quiet), if pending.is_some() => {
                        if let Some(text) = pending.take() {
                            on_render(text);
                        }
                    }
                }
            }
            // flush the trailing edit on shutdown
            if let Some(text) = pending.take() {
                on_render(text);
            }
        });
        Self { tx, worker }
    }

    /// Submit the current editor text; restarts the quiet period.
    pub fn submit(&self, text: impl Into<String>) {
        let _ = self.tx.send(text.into());
    }

    /// Close the channel and wait for the trailing render, if any.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_render_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer =
            PreviewDebouncer::spawn_with_quiet_period(Duration::from_millis(100), move |text| {
                sink.lock().unwrap().push(text);
            });

        for text in ["a", "ab", "abc"] {
            debouncer.submit(text);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(seen.lock().unwrap().clone(), vec!["abc".to_string()]);
        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_edits_render_separately() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer =
            PreviewDebouncer::spawn_with_quiet_period(Duration::from_millis(50), move |text| {
                sink.lock().unwrap().push(text);
            });

        debouncer.submit("first");
        tokio::time::sleep(Duration::from_millis(120)).await;
        debouncer.submit("second");
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            seen.lock().unwrap().clone(),
            vec!["first".to_string(), "second".to_string()]
        );
        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_edit() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer =
            PreviewDebouncer::spawn_with_quiet_period(Duration::from_secs(5), move |text| {
                sink.lock().unwrap().push(text);
            });

        debouncer.submit("unflushed");
        debouncer.shutdown().await;

        assert_eq!(seen.lock().unwrap().clone(), vec!["unflushed".to_string()]);
    }
}
