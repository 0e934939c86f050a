//! Fixed-capacity staging ring for captured events
//!
//! The producer thread copies every delivered event into the next ring slot
//! before pushing it across the bridge. Writes wrap and silently overwrite
//! the oldest slot: under an extreme burst the design accepts bounded
//! staleness instead of unbounded growth. Single-writer; the bridge's
//! blocking handoff is what keeps a slot from being reused before its value
//! has been copied out, so the write path needs no locking.

use crate::relay::types::RawEvent;

/// Default number of ring slots (must be a power of 2)
pub const DEFAULT_RING_CAPACITY: usize = 256;

/// Circular buffer of raw event slots with a single write cursor
#[derive(Debug)]
pub struct RingStore {
    slots: Box<[RawEvent]>,
    cursor: usize,
}

impl RingStore {
    /// Create a ring with the given number of slots.
    ///
    /// # Panics
    /// Panics if `capacity` is not a power of 2.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "ring capacity must be a power of 2"
        );
        Self {
            slots: vec![RawEvent::default(); capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Copy `event` into the next slot and return a reference to it.
    ///
    /// Never fails and never allocates. The reference stays valid until the
    /// cursor wraps back around after `capacity` further stores.
    #[inline]
    pub fn store(&mut self, event: RawEvent) -> &RawEvent {
        let index = self.cursor;
        self.slots[index] = event;
        self.cursor = (index + 1) & (self.slots.len() - 1);
        &self.slots[index]
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next store will write to
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Read a slot directly
    pub fn slot(&self, index: usize) -> &RawEvent {
        &self.slots[index]
    }
}

impl Default for RingStore {
    fn default() -> Self {
        Self::new(DEFAULT_RING_CAPACITY)
    }
}
