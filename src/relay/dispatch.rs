//! Producer-side dispatch path
//!
//! Runs on the capture thread for every raw callback: drop kinds the
//! capture library uses for its own bookkeeping, stage the rest in the ring,
//! push them across the bridge. Nothing here allocates or runs consumer
//! code; the only wait is the bridge's blocking enqueue.

use crate::relay::bridge::BridgeSender;
use crate::relay::ring::RingStore;
use crate::relay::session::SessionStats;
use crate::relay::types::RawEvent;
use crate::source::DispatchFn;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Filter + stage + send, owned by the producer thread for one session
pub struct EventDispatcher {
    ring: RingStore,
    sender: BridgeSender,
    stats: Arc<SessionStats>,
    /// Latched once a send fails; no further sends are attempted
    bridge_lost: bool,
}

impl EventDispatcher {
    pub fn new(ring: RingStore, sender: BridgeSender, stats: Arc<SessionStats>) -> Self {
        Self {
            ring,
            sender,
            stats,
            bridge_lost: false,
        }
    }

    /// Handle one raw callback from the capture source.
    pub fn dispatch(&mut self, event: RawEvent) {
        self.stats.events_seen.fetch_add(1, Ordering::Relaxed);

        if !event.kind.is_delivered() {
            self.stats.events_discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }

        if self.bridge_lost {
            return;
        }

        let staged = *self.ring.store(event);
        match self.sender.send(staged) {
            Ok(()) => {
                self.stats.events_relayed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                debug!("bridge closed mid-session, suppressing further sends");
                self.bridge_lost = true;
            }
        }
    }

    /// Box the dispatcher into the callback shape capture sources register.
    pub fn into_dispatch_fn(self) -> DispatchFn {
        let mut dispatcher = self;
        Box::new(move |event| dispatcher.dispatch(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::bridge::Bridge;
    use crate::relay::types::{EventKind, HookEvent};
    use parking_lot::Mutex;

    fn key_at(time: u64) -> RawEvent {
        RawEvent::keyboard(EventKind::KeyPressed, time, 0, 30, 30, 0)
    }

    fn collecting_bridge() -> (Bridge, Arc<Mutex<Vec<HookEvent>>>) {
        let seen: Arc<Mutex<Vec<HookEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut bridge = Bridge::new(8);
        bridge
            .open(Box::new(move |event: HookEvent| sink.lock().push(event)))
            .unwrap();
        (bridge, seen)
    }

    #[test]
    fn test_delivered_kinds_pass_filter() {
        let (mut bridge, seen) = collecting_bridge();
        let stats = Arc::new(SessionStats::default());
        let mut dispatcher =
            EventDispatcher::new(RingStore::new(16), bridge.sender(), Arc::clone(&stats));

        dispatcher.dispatch(key_at(1));
        dispatcher.dispatch(RawEvent::mouse(EventKind::MouseMoved, 2, 0, 0, 0, 10, 10));
        bridge.close();

        assert_eq!(seen.lock().len(), 2);
        assert_eq!(stats.events_seen.load(Ordering::Relaxed), 2);
        assert_eq!(stats.events_relayed.load(Ordering::Relaxed), 2);
        assert_eq!(stats.events_discarded.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_lifecycle_kinds_discarded_silently() {
        let (mut bridge, seen) = collecting_bridge();
        let stats = Arc::new(SessionStats::default());
        let mut dispatcher =
            EventDispatcher::new(RingStore::new(16), bridge.sender(), Arc::clone(&stats));

        dispatcher.dispatch(RawEvent::lifecycle(EventKind::HookEnabled, 0));
        dispatcher.dispatch(key_at(1));
        dispatcher.dispatch(RawEvent::lifecycle(EventKind::HookDisabled, 2));
        bridge.close();

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(stats.events_discarded.load(Ordering::Relaxed), 2);
        assert_eq!(stats.events_relayed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_send_failure_latches() {
        let (mut bridge, _seen) = collecting_bridge();
        let stats = Arc::new(SessionStats::default());
        let mut dispatcher =
            EventDispatcher::new(RingStore::new(16), bridge.sender(), Arc::clone(&stats));

        bridge.close();

        dispatcher.dispatch(key_at(1));
        dispatcher.dispatch(key_at(2));

        assert_eq!(stats.events_seen.load(Ordering::Relaxed), 2);
        assert_eq!(stats.events_relayed.load(Ordering::Relaxed), 0);
    }
}
