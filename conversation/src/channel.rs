//! Owned subscription resource shared by the change feed and presence.
//!
//! A [`Channel`] is a bounded queue of [`Frame`]s filled by one pump task.
//! The pump blocks when the queue is full. Closing stops the queue, cancels
//! the pump and waits for it to finish its cleanup (untracking presence,
//! closing the socket). Dropping a channel without closing it only cancels.

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::Frame;

/// Queue depth used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Producer half handed to a pump.
pub struct FrameSink {
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
}

impl FrameSink {
    /// Queues one frame, waiting for room.
    ///
    /// Returns `false` once the channel is closed or cancelled; the pump
    /// should stop then.
    pub async fn deliver(&self, frame: Frame) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(frame) => sent.is_ok(),
        }
    }

    /// Resolves when the owning channel is closed or dropped.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct Channel {
    frames: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
    pump: Option<JoinHandle<()>>,
}

impl Channel {
    /// Spawns `pump` feeding a queue of `capacity` frames.
    pub fn spawn<F, Fut>(capacity: usize, pump: F) -> Self
    where
        F: FnOnce(FrameSink) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, frames) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let sink = FrameSink {
            tx,
            cancel: cancel.clone(),
        };
        let pump = tokio::spawn(pump(sink));

        Self {
            frames,
            cancel,
            pump: Some(pump),
        }
    }

    /// Next queued frame; `None` once the pump has finished and the queue is drained.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    /// Releases the channel and waits for the pump to wind down.
    pub async fn close(mut self) {
        self.frames.close();
        self.cancel.cancel();
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                tracing::warn!("channel pump ended abnormally: {e}");
            }
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
