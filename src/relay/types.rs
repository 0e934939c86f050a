//! Core types for the event relay
//!
//! Defines the raw record handed out by capture sources, the consumer-facing
//! converted event, and the keycode identities used to derive modifier flags.

use serde::{Deserialize, Serialize};

/// Event kinds emitted by a capture source.
///
/// The discriminants follow the wire numbering of the capture library so a
/// raw `type` field maps straight onto this enum. `HookEnabled` and
/// `HookDisabled` are lifecycle bookkeeping and are never delivered to
/// consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// Hook installed and receiving events
    HookEnabled = 1,
    /// Hook torn down
    HookDisabled = 2,
    /// Character produced by a key press
    KeyTyped = 3,
    /// Key pressed
    KeyPressed = 4,
    /// Key released
    KeyReleased = 5,
    /// Button pressed and released in place
    MouseClicked = 6,
    /// Mouse button pressed
    MousePressed = 7,
    /// Mouse button released
    MouseReleased = 8,
    /// Pointer moved with no button held
    MouseMoved = 9,
    /// Pointer moved with a button held
    MouseDragged = 10,
    /// Wheel or trackpad scroll
    MouseWheel = 11,
}

impl EventKind {
    /// Check if events of this kind are relayed to consumers.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, EventKind::HookEnabled | EventKind::HookDisabled)
    }

    /// Check if this is a keyboard event kind
    pub fn is_keyboard(&self) -> bool {
        matches!(
            self,
            EventKind::KeyTyped | EventKind::KeyPressed | EventKind::KeyReleased
        )
    }

    /// Check if this is a pointer (non-wheel) event kind
    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            EventKind::MouseClicked
                | EventKind::MousePressed
                | EventKind::MouseReleased
                | EventKind::MouseMoved
                | EventKind::MouseDragged
        )
    }

    /// Check if this is the wheel event kind
    pub fn is_wheel(&self) -> bool {
        matches!(self, EventKind::MouseWheel)
    }
}

impl TryFrom<u8> for EventKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EventKind::HookEnabled),
            2 => Ok(EventKind::HookDisabled),
            3 => Ok(EventKind::KeyTyped),
            4 => Ok(EventKind::KeyPressed),
            5 => Ok(EventKind::KeyReleased),
            6 => Ok(EventKind::MouseClicked),
            7 => Ok(EventKind::MousePressed),
            8 => Ok(EventKind::MouseReleased),
            9 => Ok(EventKind::MouseMoved),
            10 => Ok(EventKind::MouseDragged),
            11 => Ok(EventKind::MouseWheel),
            _ => Err(()),
        }
    }
}

/// Scancode identities the relay cares about.
///
/// Modifier flags on converted keyboard events are derived from these keycode
/// identities, not from the event's modifier mask.
pub mod keycode {
    pub const ESCAPE: u16 = 0x0001;
    pub const A: u16 = 0x001E;
    pub const SHIFT_LEFT: u16 = 0x002A;
    pub const SHIFT_RIGHT: u16 = 0x0036;
    pub const CONTROL_LEFT: u16 = 0x001D;
    pub const CONTROL_RIGHT: u16 = 0x0E1D;
    pub const ALT_LEFT: u16 = 0x0038;
    pub const ALT_RIGHT: u16 = 0x0E38;
    pub const META_LEFT: u16 = 0x0E5B;
    pub const META_RIGHT: u16 = 0x0E5C;
}

/// Check if a keycode is one of the shift keys
pub fn is_shift_key(code: u16) -> bool {
    matches!(code, keycode::SHIFT_LEFT | keycode::SHIFT_RIGHT)
}

/// Check if a keycode is one of the alt keys
pub fn is_alt_key(code: u16) -> bool {
    matches!(code, keycode::ALT_LEFT | keycode::ALT_RIGHT)
}

/// Check if a keycode is one of the control keys
pub fn is_ctrl_key(code: u16) -> bool {
    matches!(code, keycode::CONTROL_LEFT | keycode::CONTROL_RIGHT)
}

/// Check if a keycode is one of the meta keys
pub fn is_meta_key(code: u16) -> bool {
    matches!(code, keycode::META_LEFT | keycode::META_RIGHT)
}

/// Keyboard payload as captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyboardData {
    /// Platform-independent scancode
    pub keycode: u16,
    /// Platform scancode as reported by the OS
    pub rawcode: u16,
    /// UTF-16 code unit, meaningful only for `KeyTyped`
    pub keychar: u16,
}

/// Pointer payload as captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseData {
    pub button: u16,
    pub clicks: u16,
    pub x: i16,
    pub y: i16,
}

/// Scroll direction of a wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelDirection {
    Vertical = 3,
    Horizontal = 4,
}

/// Scroll granularity reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelScroll {
    /// Line-by-line scrolling
    Unit = 1,
    /// Page-by-page scrolling
    Block = 2,
}

/// Wheel payload as captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WheelData {
    /// Units scrolled per notch
    pub amount: u16,
    pub clicks: u16,
    pub direction: WheelDirection,
    /// Signed notch count, negative toward the user's "up"
    pub rotation: i16,
    pub scroll_kind: WheelScroll,
    pub x: i16,
    pub y: i16,
}

/// Payload attached to a raw event. Exactly one variant is valid per
/// [`EventKind`]; the constructors on [`RawEvent`] enforce the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawPayload {
    /// Lifecycle kinds carry no payload
    None,
    Keyboard(KeyboardData),
    Mouse(MouseData),
    Wheel(WheelData),
}

/// One captured input occurrence, exactly as the producer thread sees it.
///
/// The record is plain `Copy` data: staging it in the ring and handing it
/// across the bridge never allocates. `time` is source-provided and
/// monotonically non-decreasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: EventKind,
    /// Modifier mask as reported by the source, passed through untouched
    pub mask: u16,
    pub time: u64,
    pub payload: RawPayload,
}

impl RawEvent {
    /// Create a keyboard event
    pub fn keyboard(kind: EventKind, time: u64, mask: u16, keycode: u16, rawcode: u16, keychar: u16) -> Self {
        debug_assert!(kind.is_keyboard());
        Self {
            kind,
            mask,
            time,
            payload: RawPayload::Keyboard(KeyboardData {
                keycode,
                rawcode,
                keychar,
            }),
        }
    }

    /// Create a pointer event
    pub fn mouse(kind: EventKind, time: u64, mask: u16, button: u16, clicks: u16, x: i16, y: i16) -> Self {
        debug_assert!(kind.is_mouse());
        Self {
            kind,
            mask,
            time,
            payload: RawPayload::Mouse(MouseData {
                button,
                clicks,
                x,
                y,
            }),
        }
    }

    /// Create a wheel event
    pub fn wheel(time: u64, mask: u16, data: WheelData) -> Self {
        Self {
            kind: EventKind::MouseWheel,
            mask,
            time,
            payload: RawPayload::Wheel(data),
        }
    }

    /// Create a lifecycle event (hook enabled/disabled)
    pub fn lifecycle(kind: EventKind, time: u64) -> Self {
        debug_assert!(!kind.is_delivered());
        Self {
            kind,
            mask: 0,
            time,
            payload: RawPayload::None,
        }
    }
}

impl Default for RawEvent {
    fn default() -> Self {
        Self::lifecycle(EventKind::HookEnabled, 0)
    }
}

/// Keyboard payload as delivered to consumers.
///
/// The modifier booleans are derived from the keycode identity of this very
/// event at conversion time. They answer "is this event itself a modifier
/// key" in the manner of the capture library, and are recomputed on every
/// conversion rather than carried in the raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub keycode: u16,
    pub rawcode: u16,
    /// Decoded character, present only for `KeyTyped`
    pub keychar: Option<char>,
    pub shift_key: bool,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

/// Payload of a converted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPayload {
    Keyboard(KeyEvent),
    Mouse(MouseData),
    Wheel(WheelData),
}

/// An event in the shape consumers receive it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookEvent {
    pub kind: EventKind,
    pub mask: u16,
    pub time: u64,
    pub payload: EventPayload,
}

impl HookEvent {
    /// Convert a raw record into the consumer-facing shape.
    ///
    /// Runs on the consumer thread only. Returns `None` for lifecycle kinds
    /// and for records whose payload variant does not match their kind.
    pub fn from_raw(raw: &RawEvent) -> Option<Self> {
        let payload = match (raw.kind, raw.payload) {
            (kind, RawPayload::Keyboard(data)) if kind.is_keyboard() => {
                let keychar = if kind == EventKind::KeyTyped {
                    char::from_u32(u32::from(data.keychar))
                } else {
                    None
                };
                EventPayload::Keyboard(KeyEvent {
                    keycode: data.keycode,
                    rawcode: data.rawcode,
                    keychar,
                    shift_key: is_shift_key(data.keycode),
                    alt_key: is_alt_key(data.keycode),
                    ctrl_key: is_ctrl_key(data.keycode),
                    meta_key: is_meta_key(data.keycode),
                })
            }
            (kind, RawPayload::Mouse(data)) if kind.is_mouse() => EventPayload::Mouse(data),
            (kind, RawPayload::Wheel(data)) if kind.is_wheel() => EventPayload::Wheel(data),
            _ => return None,
        };

        Some(Self {
            kind: raw.kind,
            mask: raw.mask,
            time: raw.time,
            payload,
        })
    }

    /// Keyboard payload, if this is a keyboard event
    pub fn keyboard(&self) -> Option<&KeyEvent> {
        match &self.payload {
            EventPayload::Keyboard(data) => Some(data),
            _ => None,
        }
    }

    /// Pointer payload, if this is a pointer event
    pub fn mouse(&self) -> Option<&MouseData> {
        match &self.payload {
            EventPayload::Mouse(data) => Some(data),
            _ => None,
        }
    }

    /// Wheel payload, if this is a wheel event
    pub fn wheel(&self) -> Option<&WheelData> {
        match &self.payload {
            EventPayload::Wheel(data) => Some(data),
            _ => None,
        }
    }
}
