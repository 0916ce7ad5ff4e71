//! Event queue between the orchestrator and its consumer
//!
//! An unbounded multi-producer / single-consumer mailbox. Pushing never blocks
//! and never fails; draining never blocks. Events from one producer are observed
//! in push order.

use crate::types::DownloadEvent;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Push-only destination for download events
pub trait EventSink: Send + Sync {
    /// Append an event; must not block
    fn push(&self, event: DownloadEvent);
}

/// Producer half of the event queue
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: UnboundedSender<DownloadEvent>,
}

impl EventSink for EventSender {
    fn push(&self, event: DownloadEvent) {
        // A dropped consumer means nobody is listening any more; the event is discarded.
        if self.tx.send(event).is_err() {
            tracing::trace!("event queue consumer dropped, discarding event");
        }
    }
}

/// Consumer half of the event queue
#[derive(Debug)]
pub struct EventQueue {
    rx: UnboundedReceiver<DownloadEvent>,
}

impl EventQueue {
    /// Create a connected sender/queue pair
    pub fn channel() -> (EventSender, EventQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSender { tx }, EventQueue { rx })
    }

    /// Take every event currently queued without waiting
    ///
    /// Returns an empty vector when nothing is pending.
    pub fn drain_nonblocking(&mut self) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event
    ///
    /// Returns `None` once every sender is dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<DownloadEvent> {
        self.rx.recv().await
    }
}

/// Collecting sink, handy for synchronous callers and tests
impl EventSink for Mutex<Vec<DownloadEvent>> {
    fn push(&self, event: DownloadEvent) {
        match self.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
