//! Script-driven capture source
//!
//! Plays a fixed list of events through the dispatch callback, framed by the
//! hook-enabled/hook-disabled lifecycle records a real hook library emits.
//! By default `run` then parks like a real capture loop until
//! `request_stop`; `auto_stop` makes it return as soon as the script is
//! drained, and `failing` makes `run` report a chosen status without
//! emitting anything. Used by the test suites and the demo binary.

use crate::debug::LogLevel;
use crate::relay::types::{EventKind, RawEvent};
use crate::source::{CaptureSource, DispatchFn, HookStatus, LoggerFn};
use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct RunControl {
    stop_requested: bool,
}

/// A [`CaptureSource`] that emits a prepared script
pub struct SyntheticSource {
    script: Mutex<Vec<RawEvent>>,
    dispatch: Mutex<Option<DispatchFn>>,
    logger: Mutex<Option<LoggerFn>>,
    control: Mutex<RunControl>,
    unblock: Condvar,
    run_status: HookStatus,
    stop_status: HookStatus,
    hold_open: bool,
}

impl SyntheticSource {
    /// Empty script, clean statuses, parks until stopped
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            dispatch: Mutex::new(None),
            logger: Mutex::new(None),
            control: Mutex::new(RunControl::default()),
            unblock: Condvar::new(),
            run_status: HookStatus::Ok,
            stop_status: HookStatus::Ok,
            hold_open: true,
        }
    }

    /// Set the events `run` will emit, in order
    pub fn with_events(self, events: Vec<RawEvent>) -> Self {
        *self.script.lock() = events;
        self
    }

    /// Make `run` return right after the script instead of parking
    pub fn auto_stop(mut self) -> Self {
        self.hold_open = false;
        self
    }

    /// Make `run` report `status` immediately, emitting nothing
    pub fn failing(mut self, status: HookStatus) -> Self {
        self.run_status = status;
        self
    }

    /// Status `request_stop` reports
    pub fn with_stop_status(mut self, status: HookStatus) -> Self {
        self.stop_status = status;
        self
    }

    /// Check if a stop has been requested for the current run
    pub fn stop_requested(&self) -> bool {
        self.control.lock().stop_requested
    }

    fn log(&self, level: LogLevel, message: &str) {
        if let Some(logger) = &*self.logger.lock() {
            logger(level, message);
        }
    }

    fn emit(&self, event: RawEvent) {
        if let Some(dispatch) = self.dispatch.lock().as_mut() {
            dispatch(event);
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for SyntheticSource {
    fn register_dispatch(&self, dispatch: DispatchFn) {
        *self.dispatch.lock() = Some(dispatch);
    }

    fn register_logger(&self, logger: LoggerFn) {
        *self.logger.lock() = Some(logger);
    }

    fn run(&self) -> HookStatus {
        if !self.run_status.is_ok() {
            return self.run_status;
        }

        self.control.lock().stop_requested = false;
        self.log(LogLevel::Info, "synthetic capture loop engaged");

        let script: Vec<RawEvent> = self.script.lock().clone();
        let last_time = script.last().map(|event| event.time).unwrap_or(0);

        self.emit(RawEvent::lifecycle(EventKind::HookEnabled, 0));
        for event in script {
            self.emit(event);
        }

        if self.hold_open {
            let mut control = self.control.lock();
            while !control.stop_requested {
                self.unblock.wait(&mut control);
            }
        }

        self.emit(RawEvent::lifecycle(EventKind::HookDisabled, last_time));
        self.log(LogLevel::Debug, "synthetic capture loop returning");

        HookStatus::Ok
    }

    fn request_stop(&self) -> HookStatus {
        {
            let mut control = self.control.lock();
            control.stop_requested = true;
        }
        self.unblock.notify_all();
        self.stop_status
    }
}
