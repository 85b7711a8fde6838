//! Cosmetic progress ticker.
//!
//! Runs [`CosmeticProgress`] on a timer independently of real polling
//! and publishes the value through a [`watch`] channel. The value
//! creeps toward the cap until [`CosmeticProgressHandle::complete`]
//! snaps it to 100.

use std::time::Duration;

use adgen_core::fake_progress::CosmeticProgress;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running cosmetic ticker.
///
/// Dropping the handle stops the ticker at its current value.
pub struct CosmeticProgressHandle {
    rx: watch::Receiver<u8>,
    done: Option<oneshot::Sender<()>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CosmeticProgressHandle {
    /// Latest published value.
    pub fn value(&self) -> u8 {
        *self.rx.borrow()
    }

    /// A receiver that sees every published value.
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.rx.clone()
    }

    /// Snap to 100 and stop ticking. Returns the final value, which is
    /// 100 unless the ticker was already cancelled.
    pub async fn complete(mut self) -> u8 {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        let _ = (&mut self.task).await;
        let value = *self.rx.borrow();
        value
    }

    /// Stop ticking without completing.
    pub async fn stop(self) -> u8 {
        self.cancel.cancel();
        let _ = self.task.await;
        let value = *self.rx.borrow();
        value
    }
}

/// Spawn a ticker advancing cosmetic progress every `tick`.
pub fn spawn_cosmetic_progress(tick: Duration, cancel: CancellationToken) -> CosmeticProgressHandle {
    let (tx, rx) = watch::channel(0u8);
    let (done_tx, mut done_rx) = oneshot::channel::<()>();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        let mut model = CosmeticProgress::default();
        let mut ticker = tokio::time::interval(tick);
        // The first tick of `interval` fires immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = task_cancel.cancelled() => break,
                done = &mut done_rx => {
                    if done.is_ok() {
                        tx.send_replace(model.complete());
                    }
                    break;
                }
                _ = ticker.tick() => {
                    tx.send_replace(model.advance());
                }
            }
        }
    });

    CosmeticProgressHandle {
        rx,
        done: Some(done_tx),
        cancel,
        task,
    }
}
