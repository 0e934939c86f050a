//! # Hook Relay
//!
//! An ordered, backpressured relay that moves OS-level input events from a
//! blocking capture loop to a consumer running on its own thread.
//!
//! ## Overview
//!
//! Global input hooks (keyboard/mouse taps) hand out events through a C-style
//! callback that runs on whatever thread executes the hook's blocking run
//! loop. Consumers almost never live on that thread. This crate owns the gap
//! between the two: it filters the callback traffic, stages each event in a
//! fixed-size ring, and pushes it across a bounded, blocking bridge so the
//! consumer sees every delivered event exactly once, in capture order,
//! without the producer ever executing consumer code.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hook_relay::relay::session::HookSession;
//! use hook_relay::source::synthetic::SyntheticSource;
//! use hook_relay::HookEvent;
//!
//! let source = SyntheticSource::new().auto_stop();
//! let mut session = HookSession::new(source);
//!
//! session.start(Box::new(|event: HookEvent| {
//!     println!("{event:?}");
//! })).expect("session already running");
//!
//! session.stop();
//! session.join();
//! ```
//!
//! ## Event Pipeline
//!
//! ```text
//! ┌───────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ CaptureSource │──▶│  Dispatch  │──▶│  RingStore │──▶│   Bridge   │
//! │  (blocking)   │   │  (filter)  │   │  (staging) │   │ (blocking) │
//! └───────────────┘   └────────────┘   └────────────┘   └─────┬──────┘
//!            producer thread ("hook-worker")                  │
//! ────────────────────────────────────────────────────────────┼───────────
//!            consumer thread ("relay-consumer")               ▼
//!                                 ┌─────────────┐   ┌──────────────────┐
//!                                 │   Convert   │──▶│   RelayHandler   │
//!                                 │ (HookEvent) │   │ on_event / _end  │
//!                                 └─────────────┘   └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`relay`]: ring staging, bridge handoff, dispatch filter, session state
//!   machine
//! - [`source`]: the capture-source seam and a synthetic implementation
//! - [`debug`]: the toggleable capture-library log sink
//! - [`app`]: CLI and configuration for the demo binary

pub mod app;
pub mod debug;
pub mod relay;
pub mod source;

// Re-export commonly used types
pub use debug::{DebugSink, LogLevel};
pub use relay::bridge::{Bridge, RelayHandler};
pub use relay::ring::RingStore;
pub use relay::session::{HookSession, HookState, SessionStats};
pub use relay::types::{EventKind, EventPayload, HookEvent, RawEvent, RawPayload};
pub use source::{CaptureSource, HookStatus};

/// Result type alias for the relay
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the relay
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("hook session already running")]
    AlreadyRunning,

    #[error("bridge already open")]
    BridgeAlreadyOpen,

    #[error("bridge closed")]
    BridgeClosed,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
