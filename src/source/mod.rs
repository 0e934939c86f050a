//! The capture-source seam
//!
//! The relay never talks to an OS hook directly. Anything that can pump raw
//! events through a callback (a native hook library, a replay file, a
//! synthetic generator) plugs in behind [`CaptureSource`]. Registration
//! happens once before the session starts; `run` then blocks its calling
//! thread for the whole session and `request_stop` is the cooperative,
//! best-effort way to make it return.

pub mod synthetic;

pub use synthetic::SyntheticSource;

use crate::debug::LogLevel;
use crate::relay::types::RawEvent;
use serde::{Deserialize, Serialize};

/// Per-event callback a source invokes on its run thread
pub type DispatchFn = Box<dyn FnMut(RawEvent) + Send>;

/// Leveled log callback for the source's own diagnostics
pub type LoggerFn = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Status codes a capture source reports from `run` and `request_stop`.
///
/// The set is closed and carries the capture library's numeric codes; each
/// code has a fixed description used for error-level log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HookStatus {
    Ok = 0x00,
    UnknownFailure = 0x01,
    OutOfMemory = 0x02,
    // X11
    DisplayOpenFailed = 0x20,
    RecordExtensionMissing = 0x21,
    RecordRangeAllocFailed = 0x22,
    RecordContextCreateFailed = 0x23,
    RecordContextEnableFailed = 0x24,
    RecordContextQueryFailed = 0x25,
    // Windows
    WindowsHookFailed = 0x30,
    // macOS
    AccessibilityDisabled = 0x40,
    EventPortFailed = 0x41,
    RunLoopSourceFailed = 0x42,
    RunLoopUnavailable = 0x43,
    RunLoopObserverFailed = 0x44,
}

impl HookStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HookStatus::Ok)
    }

    /// The capture library's numeric code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Fixed description for log lines
    pub fn describe(&self) -> &'static str {
        match self {
            HookStatus::Ok => "Hook completed without error.",
            HookStatus::UnknownFailure => "An unknown hook error occurred.",
            HookStatus::OutOfMemory => "Failed to allocate memory.",
            HookStatus::DisplayOpenFailed => "Failed to open X11 display.",
            HookStatus::RecordExtensionMissing => "Unable to locate XRecord extension.",
            HookStatus::RecordRangeAllocFailed => "Unable to allocate XRecord range.",
            HookStatus::RecordContextCreateFailed => "Unable to allocate XRecord context.",
            HookStatus::RecordContextEnableFailed => "Failed to enable XRecord context.",
            HookStatus::RecordContextQueryFailed => "Failed to get XRecord context.",
            HookStatus::WindowsHookFailed => "Failed to register low level windows hook.",
            HookStatus::AccessibilityDisabled => "Failed to enable access for assistive devices.",
            HookStatus::EventPortFailed => "Failed to create apple event port.",
            HookStatus::RunLoopSourceFailed => "Failed to create apple run loop source.",
            HookStatus::RunLoopUnavailable => "Failed to acquire apple run loop.",
            HookStatus::RunLoopObserverFailed => "Failed to create apple run loop observer.",
        }
    }
}

/// A blocking producer of raw input events.
///
/// Implementations are shared between the producer thread (which calls
/// `run`) and the session's caller thread (which calls `request_stop`), so
/// every method takes `&self`; implementations manage their own interior
/// mutability.
pub trait CaptureSource: Send + Sync + 'static {
    /// Install the per-event callback. Called once before `run`; a later
    /// registration replaces the previous callback.
    fn register_dispatch(&self, dispatch: DispatchFn);

    /// Install the log callback. Called once before `run`.
    fn register_logger(&self, logger: LoggerFn);

    /// Run the capture loop, blocking the calling thread until stopped or
    /// failed. The returned status is `Ok` for a clean stop.
    fn run(&self) -> HookStatus;

    /// Ask the blocked `run` call to return. Best-effort: returning `Ok`
    /// means the request was issued, not that the loop has exited.
    fn request_stop(&self) -> HookStatus;
}
