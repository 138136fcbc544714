// src/session/timer.rs
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// A cancellable periodic callback. The first tick fires one `period` after
/// spawning. The loop ends when the callback breaks, on `stop()`, or when
/// the `Countdown` is dropped.
pub struct Countdown {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let (cancel, mut cancelled) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = &mut cancelled => {
                        debug!("⏹️ Countdown cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if on_tick().await.is_break() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel: Some(cancel),
            handle,
        }
    }

    /// Stops future ticks. A tick already running completes.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}
