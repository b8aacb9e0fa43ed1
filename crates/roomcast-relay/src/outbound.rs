//! Bounded per-connection send buffer.
//!
//! Every connection drains its own queue into its WebSocket. Pushing never
//! blocks: once the queue is at capacity the oldest queued audio frame is
//! evicted to make room, or the oldest message of any kind if no audio is
//! queued. Slow listeners lose audio instead of growing memory without bound.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Utf8Bytes;

/// A serialized message waiting to be written to a connection. The text is
/// reference-counted, so one frame fanned out to a room is shared by every
/// recipient's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub text: Utf8Bytes,
    /// Lossy messages are evicted first when the queue is full.
    pub lossy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued after evicting an older message.
    Evicted,
    Closed,
}

struct Inner {
    items: Mutex<VecDeque<Outbound>>,
    notify: Notify,
    capacity: usize,
    closed: AtomicBool,
    evicted: AtomicU64,
}

/// Cloneable handle to one connection's queue.
#[derive(Clone)]
pub struct OutboundQueue {
    inner: Arc<Inner>,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
                notify: Notify::new(),
                capacity,
                closed: AtomicBool::new(false),
                evicted: AtomicU64::new(0),
            }),
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<Outbound>> {
        // A panic while holding this lock leaves the deque intact.
        self.inner
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, message: Outbound) -> PushOutcome {
        if self.is_closed() {
            return PushOutcome::Closed;
        }

        let outcome = {
            let mut items = self.items();
            let outcome = if items.len() >= self.inner.capacity {
                let victim = items.iter().position(|m| m.lossy).unwrap_or(0);
                items.remove(victim);
                self.inner.evicted.fetch_add(1, Ordering::Relaxed);
                PushOutcome::Evicted
            } else {
                PushOutcome::Queued
            };
            items.push_back(message);
            outcome
        };

        self.inner.notify.notify_one();
        outcome
    }

    /// Wait for the next message. Returns `None` once the queue is closed and
    /// drained.
    pub async fn recv(&self) -> Option<Outbound> {
        loop {
            if let Some(message) = self.try_recv() {
                return Some(message);
            }
            if self.is_closed() {
                return None;
            }
            self.inner.notify.notified().await;
        }
    }

    pub fn try_recv(&self) -> Option<Outbound> {
        self.items().pop_front()
    }

    /// Stop accepting messages and wake the reader so it can finish.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Total messages evicted since the queue was created.
    pub fn evicted(&self) -> u64 {
        self.inner.evicted.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OutboundQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundQueue")
            .field("len", &self.len())
            .field("capacity", &self.inner.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}
