//! Session lifecycle
//!
//! A [`HookSession`] owns everything one capture session needs (ring,
//! bridge, dispatcher, state) and drives it through
//! `Idle → Starting → Running → Stopping → Stopped → Idle`. The only
//! process-wide pieces are the single-active-session guard and the debug
//! sink; event buffers never live in globals.
//!
//! `start` returns as soon as the producer thread is launched; `stop` only
//! asks the capture source to unblock and may take arbitrarily long to take
//! effect. Failures discovered on the producer thread after `start` has
//! returned cannot be handed back to any caller, so they surface through the
//! debug sink at error level and through [`HookSession::last_failure`]; the
//! state machine still winds down to `Stopped` and rests at `Idle`.

use crate::debug::{DebugSink, LogLevel};
use crate::relay::bridge::{Bridge, RelayHandler};
use crate::relay::dispatch::EventDispatcher;
use crate::relay::ring::RingStore;
use crate::app::config::RelayConfig;
use crate::source::{CaptureSource, HookStatus};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;
use uuid::Uuid;

/// Lifecycle states of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HookState {
    /// No session in flight; `start` is accepted
    Idle = 0,
    /// `start` is wiring up the relay
    Starting = 1,
    /// Producer thread launched, events flowing
    Running = 2,
    /// Stop requested or run loop exiting
    Stopping = 3,
    /// Producer thread exited, resources released
    Stopped = 4,
}

impl HookState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => HookState::Starting,
            2 => HookState::Running,
            3 => HookState::Stopping,
            4 => HookState::Stopped,
            _ => HookState::Idle,
        }
    }
}

/// Atomic wrapper for [`HookState`]
#[derive(Debug)]
pub struct AtomicHookState(AtomicU8);

impl AtomicHookState {
    pub const fn new(state: HookState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self, ordering: Ordering) -> HookState {
        HookState::from_u8(self.0.load(ordering))
    }

    pub fn store(&self, state: HookState, ordering: Ordering) {
        self.0.store(state as u8, ordering);
    }

    pub fn compare_exchange(
        &self,
        current: HookState,
        new: HookState,
        success: Ordering,
        failure: Ordering,
    ) -> std::result::Result<HookState, HookState> {
        self.0
            .compare_exchange(current as u8, new as u8, success, failure)
            .map(HookState::from_u8)
            .map_err(HookState::from_u8)
    }
}

impl Default for AtomicHookState {
    fn default() -> Self {
        Self::new(HookState::Idle)
    }
}

/// Producer-path counters for one session object
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Raw callbacks received from the source
    pub events_seen: AtomicU64,
    /// Callbacks dropped by the delivered-kind filter
    pub events_discarded: AtomicU64,
    /// Events accepted by the bridge
    pub events_relayed: AtomicU64,
}

/// At most one session may be live in the process at a time
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// One capture session: owns its source, relay plumbing, and state machine
pub struct HookSession<S: CaptureSource> {
    source: Arc<S>,
    config: RelayConfig,
    state: Arc<AtomicHookState>,
    worker: Option<JoinHandle<()>>,
    last_failure: Arc<Mutex<Option<HookStatus>>>,
    stats: Arc<SessionStats>,
    sink: Arc<DebugSink>,
    id: Uuid,
}

impl<S: CaptureSource> HookSession<S> {
    /// Session with default configuration and the process-wide debug sink
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            config: RelayConfig::default(),
            state: Arc::new(AtomicHookState::default()),
            worker: None,
            last_failure: Arc::new(Mutex::new(None)),
            stats: Arc::new(SessionStats::default()),
            sink: crate::debug::global_sink(),
            id: Uuid::new_v4(),
        }
    }

    /// Session with explicit configuration.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration fails validation.
    pub fn with_config(source: S, config: RelayConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(source);
        session.config = config;
        Ok(session)
    }

    /// Replace the debug sink (tests inject buffered sinks here)
    pub fn with_sink(mut self, sink: Arc<DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_state(&self) -> HookState {
        self.state.load(Ordering::SeqCst)
    }

    /// Status of the most recent failed run, readable once the session ended
    pub fn last_failure(&self) -> Option<HookStatus> {
        *self.last_failure.lock()
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }

    /// Toggle the debug sink feeding capture-library output
    pub fn set_debug(&self, enabled: bool) {
        self.sink.set_enabled(enabled);
    }

    /// Start the session.
    ///
    /// Registers the dispatch and log callbacks with the source, opens the
    /// bridge, launches the `hook-worker` producer thread, and returns
    /// without waiting for it. The session is `Running` on return.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyRunning`], with no side effects, if this
    /// session is not `Idle` or another session is active in the process.
    pub fn start(&mut self, handler: Box<dyn RelayHandler>) -> Result<()> {
        if self
            .state
            .compare_exchange(
                HookState::Idle,
                HookState::Starting,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }

        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.state.store(HookState::Idle, Ordering::SeqCst);
            return Err(Error::AlreadyRunning);
        }

        // The previous run's thread has already exited (state was Idle);
        // reap its handle.
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        *self.last_failure.lock() = None;

        let mut bridge = Bridge::new(self.config.bridge_capacity);
        if let Err(err) = bridge.open(handler) {
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
            self.state.store(HookState::Idle, Ordering::SeqCst);
            return Err(err);
        }

        let dispatcher = EventDispatcher::new(
            RingStore::new(self.config.ring_capacity),
            bridge.sender(),
            Arc::clone(&self.stats),
        );
        self.source.register_dispatch(dispatcher.into_dispatch_fn());

        let logger_sink = Arc::clone(&self.sink);
        self.source.register_logger(Box::new(move |level, message| {
            logger_sink.log(level, message);
        }));

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let last_failure = Arc::clone(&self.last_failure);
        let sink = Arc::clone(&self.sink);
        let session = self.id;

        // Running before the spawn: a fast source may finish and walk the
        // state machine to Idle before this thread regains control.
        self.state.store(HookState::Running, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name("hook-worker".into())
            .spawn(move || {
                debug!(%session, "hook worker running");

                let status = source.run();
                if !status.is_ok() {
                    sink.log(
                        LogLevel::Error,
                        &format!("{} ({:#04x})", status.describe(), status.code()),
                    );
                    *last_failure.lock() = Some(status);
                }

                state.store(HookState::Stopping, Ordering::SeqCst);
                bridge.close();
                state.store(HookState::Stopped, Ordering::SeqCst);
                SESSION_ACTIVE.store(false, Ordering::SeqCst);
                state.store(HookState::Idle, Ordering::SeqCst);

                debug!(%session, "hook worker exited");
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(err) => {
                // The closure, bridge included, was dropped; Bridge::drop
                // already closed it and released the handler.
                SESSION_ACTIVE.store(false, Ordering::SeqCst);
                self.state.store(HookState::Idle, Ordering::SeqCst);
                Err(err.into())
            }
        }
    }

    /// Ask the session to stop.
    ///
    /// Only acts when `Running`: transitions to `Stopping` and issues the
    /// source's cooperative stop request. In every other state this is an
    /// inert no-op, including when no hook was ever started.
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(
                HookState::Running,
                HookState::Stopping,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            debug!(session = %self.id, "stop requested");
            let status = self.source.request_stop();
            if !status.is_ok() {
                self.sink.log(
                    LogLevel::Error,
                    &format!("{} ({:#04x})", status.describe(), status.code()),
                );
            }
        }
    }

    /// Wait for the producer thread of the current or most recent run to
    /// exit. Returns immediately if none was launched.
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl<S: CaptureSource> Drop for HookSession<S> {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::{EventKind, HookEvent, RawEvent};
    use crate::source::synthetic::SyntheticSource;

    /// The process-wide guard admits one live session; serialize the tests
    /// that start one.
    fn session_lock() -> parking_lot::MutexGuard<'static, ()> {
        static LOCK: Mutex<()> = Mutex::new(());
        LOCK.lock()
    }

    fn key_at(time: u64) -> RawEvent {
        RawEvent::keyboard(EventKind::KeyPressed, time, 0, 30, 30, 0)
    }

    #[test]
    fn test_state_atomics() {
        let state = AtomicHookState::default();
        assert_eq!(state.load(Ordering::SeqCst), HookState::Idle);

        state.store(HookState::Running, Ordering::SeqCst);
        assert_eq!(state.load(Ordering::SeqCst), HookState::Running);

        let swapped = state.compare_exchange(
            HookState::Running,
            HookState::Stopping,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        assert_eq!(swapped, Ok(HookState::Running));

        let failed = state.compare_exchange(
            HookState::Running,
            HookState::Stopped,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        assert_eq!(failed, Err(HookState::Stopping));
    }

    #[test]
    fn test_state_from_u8_fallback() {
        assert_eq!(HookState::from_u8(0), HookState::Idle);
        assert_eq!(HookState::from_u8(2), HookState::Running);
        assert_eq!(HookState::from_u8(4), HookState::Stopped);
        assert_eq!(HookState::from_u8(99), HookState::Idle);
    }

    #[test]
    fn test_stop_before_start_is_inert() {
        let _guard = session_lock();
        let session = HookSession::new(SyntheticSource::new());

        assert_eq!(session.current_state(), HookState::Idle);
        session.stop();
        assert_eq!(session.current_state(), HookState::Idle);
    }

    #[test]
    fn test_start_delivers_and_settles_idle() {
        let _guard = session_lock();
        let seen: Arc<Mutex<Vec<HookEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let source = SyntheticSource::new()
            .with_events(vec![key_at(1), key_at(2), key_at(3)])
            .auto_stop();
        let mut session = HookSession::new(source);

        session
            .start(Box::new(move |event: HookEvent| sink.lock().push(event)))
            .unwrap();
        session.join();

        assert_eq!(session.current_state(), HookState::Idle);
        assert_eq!(seen.lock().len(), 3);
        assert!(session.last_failure().is_none());
        assert_eq!(session.stats().events_relayed.load(Ordering::Relaxed), 3);
        // The enabled/disabled framing was filtered out.
        assert_eq!(session.stats().events_discarded.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_double_start_rejected() {
        let _guard = session_lock();
        let mut session = HookSession::new(SyntheticSource::new());

        session.start(Box::new(|_event: HookEvent| {})).unwrap();
        assert_eq!(session.current_state(), HookState::Running);

        let second = session.start(Box::new(|_event: HookEvent| {}));
        assert!(matches!(second, Err(Error::AlreadyRunning)));
        assert_eq!(session.current_state(), HookState::Running);

        session.stop();
        session.join();
        assert_eq!(session.current_state(), HookState::Idle);
    }
}
