//! Event relay core
//!
//! Everything between the capture callback and the consumer handler: the
//! staging ring, the blocking bridge, the producer-side dispatch filter, and
//! the session state machine that ties them together.

pub mod bridge;
pub mod dispatch;
pub mod ring;
pub mod session;
pub mod types;

pub use bridge::{Bridge, BridgeSender, RelayHandler};
pub use dispatch::EventDispatcher;
pub use ring::RingStore;
pub use session::{HookSession, HookState, SessionStats};
pub use types::{EventKind, EventPayload, HookEvent, RawEvent, RawPayload};
