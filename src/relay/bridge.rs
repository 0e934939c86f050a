//! Producer→consumer handoff
//!
//! The bridge is the only path between the capture thread and consumer code.
//! It owns a bounded FIFO queue and the consumer thread that drains it.
//! `send` blocks the producer until the event has been accepted into the
//! queue. Acceptance, not handler completion: blocking-enqueue backpressure
//! without a full round trip per event. Accepted events are
//! never dropped: closing the bridge lets the consumer drain everything that
//! was queued before the end-of-session hook fires.
//!
//! Conversion from [`RawEvent`] to the consumer-facing [`HookEvent`] happens
//! on the consumer thread, keeping the producer path down to a copy and an
//! enqueue. Capture sources are latency-sensitive; a slow callback can stall
//! system-wide input on some platforms.

use crate::relay::types::{HookEvent, RawEvent};
use crate::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Default bound on queued-but-undelivered events.
///
/// Must stay below the staging ring's capacity so a ring slot can never be
/// legitimately reused before its value has left the queue.
pub const DEFAULT_BRIDGE_CAPACITY: usize = 64;

/// Consumer surface of the relay.
///
/// Both methods run on the consumer thread, never on the producer thread.
/// `on_event` is invoked once per delivered event, in capture order;
/// `on_session_end` exactly once after the last event of the session.
pub trait RelayHandler: Send {
    fn on_event(&mut self, event: HookEvent);

    fn on_session_end(&mut self) {}
}

impl<F: FnMut(HookEvent) + Send> RelayHandler for F {
    fn on_event(&mut self, event: HookEvent) {
        self(event)
    }
}

struct Channel {
    queue: VecDeque<RawEvent>,
    closed: bool,
}

struct Shared {
    channel: Mutex<Channel>,
    capacity: usize,
    /// Signaled when the consumer frees a queue slot or the bridge closes
    slot_freed: Condvar,
    /// Signaled when the producer enqueues or the bridge closes
    event_ready: Condvar,
}

/// Ordered, backpressured handoff between the producer thread and the
/// consumer thread. See the module docs for the delivery contract.
pub struct Bridge {
    shared: Arc<Shared>,
    consumer: Option<JoinHandle<()>>,
}

/// Producer-side handle for pushing events through the bridge.
///
/// Only the producer thread should call [`BridgeSender::send`]; the FIFO
/// guarantee is per sending thread.
#[derive(Clone)]
pub struct BridgeSender {
    shared: Arc<Shared>,
}

impl Bridge {
    /// Create a bridge with the given queue bound.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bridge capacity must be at least 1");
        Self {
            shared: Arc::new(Shared {
                channel: Mutex::new(Channel {
                    queue: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                capacity,
                slot_freed: Condvar::new(),
                event_ready: Condvar::new(),
            }),
            consumer: None,
        }
    }

    /// Register the consumer handler and spawn the consumer thread.
    ///
    /// # Errors
    /// Returns [`Error::BridgeAlreadyOpen`] if called again without an
    /// intervening [`Bridge::close`].
    pub fn open(&mut self, handler: Box<dyn RelayHandler>) -> Result<()> {
        if self.consumer.is_some() {
            return Err(Error::BridgeAlreadyOpen);
        }

        self.shared.channel.lock().closed = false;

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("relay-consumer".into())
            .spawn(move || consume_loop(shared, handler))?;

        self.consumer = Some(handle);
        Ok(())
    }

    /// Handle for the producer thread
    pub fn sender(&self) -> BridgeSender {
        BridgeSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Check if a consumer is attached
    pub fn is_open(&self) -> bool {
        self.consumer.is_some()
    }

    /// Close the bridge.
    ///
    /// Marks it unusable for further sends (a blocked sender wakes up with
    /// [`Error::BridgeClosed`]), waits for the consumer to drain every
    /// accepted event and run its end-of-session hook, then releases the
    /// handler. Idempotent.
    pub fn close(&mut self) {
        {
            let mut channel = self.shared.channel.lock();
            if channel.closed && self.consumer.is_none() {
                return;
            }
            channel.closed = true;
        }
        self.shared.event_ready.notify_all();
        self.shared.slot_freed.notify_all();

        if let Some(handle) = self.consumer.take() {
            if handle.join().is_err() {
                debug!("relay consumer thread panicked during drain");
            }
        }
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.close();
    }
}

impl BridgeSender {
    /// Push one event toward the consumer, blocking until it is accepted
    /// into the delivery queue.
    ///
    /// # Errors
    /// Returns [`Error::BridgeClosed`] if the bridge was closed before the
    /// event could be accepted. This is the signal to stop emitting for the
    /// session; no event accepted earlier is lost.
    pub fn send(&self, event: RawEvent) -> Result<()> {
        let mut channel = self.shared.channel.lock();
        loop {
            if channel.closed {
                return Err(Error::BridgeClosed);
            }
            if channel.queue.len() < self.shared.capacity {
                channel.queue.push_back(event);
                drop(channel);
                self.shared.event_ready.notify_one();
                return Ok(());
            }
            self.shared.slot_freed.wait(&mut channel);
        }
    }

    /// Check if the bridge has been closed
    pub fn is_closed(&self) -> bool {
        self.shared.channel.lock().closed
    }
}

fn consume_loop(shared: Arc<Shared>, mut handler: Box<dyn RelayHandler>) {
    loop {
        let next = {
            let mut channel = shared.channel.lock();
            loop {
                // Pop before checking `closed` so a close never discards
                // accepted events.
                if let Some(raw) = channel.queue.pop_front() {
                    break Some(raw);
                }
                if channel.closed {
                    break None;
                }
                shared.event_ready.wait(&mut channel);
            }
        };

        match next {
            Some(raw) => {
                shared.slot_freed.notify_one();
                if let Some(event) = HookEvent::from_raw(&raw) {
                    handler.on_event(event);
                }
            }
            None => break,
        }
    }

    handler.on_session_end();
}
